//! Auth command handlers.

use smartdash_core::{Dashboard, PasswordChangeForm, ProfileUpdate, Registration, User};

use crate::cli::{AuthArgs, AuthCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(u: &User) -> String {
    let mut lines = vec![
        format!("ID:          {}", output::or_dash(u.id.as_deref())),
        format!("Name:        {}", u.display_name()),
        format!("Email:       {}", output::or_dash(u.email.as_deref())),
    ];
    if let Some(ref prefs) = u.preferences {
        lines.push(format!("Theme:       {}", prefs.theme));
        lines.push(format!("Language:    {}", prefs.language));
        lines.push(format!("Timezone:    {}", prefs.timezone));
    }
    if let Some(ref n) = u.notification_settings {
        let mut channels = Vec::new();
        if n.email_alerts {
            channels.push("email");
        }
        if n.push_notifications {
            channels.push("push");
        }
        if n.sms_alerts {
            channels.push("sms");
        }
        let scope = if n.critical_only { " (critical only)" } else { "" };
        lines.push(format!("Alerts via:  {}{scope}", channels.join(", ")));
    }
    lines.join("\n")
}

fn render_user(user: &User, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, user, detail, |u| {
        u.id.clone().unwrap_or_default()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    dashboard: &Dashboard,
    args: AuthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AuthCommand::Login { email, password } => {
            let password = util::password_or_prompt(password, "Password: ")?;
            let session = dashboard.login(&email, &password).await?;
            let who = session.user_id.as_deref().unwrap_or("?");
            output::notice(&format!("Signed in as user {who}"), global.quiet);
            Ok(())
        }

        AuthCommand::Register {
            first_name,
            last_name,
            email,
            password,
        } => {
            let password = util::password_or_prompt(password, "Choose a password: ")?;
            let form = Registration {
                first_name,
                last_name,
                email,
                password,
            };
            let session = dashboard.register(&form).await?;
            let who = session.user_id.as_deref().unwrap_or("?");
            output::notice(
                &format!("Account created, signed in as user {who}"),
                global.quiet,
            );
            Ok(())
        }

        AuthCommand::Logout => {
            dashboard.logout();
            output::notice("Signed out", global.quiet);
            Ok(())
        }

        AuthCommand::Check => {
            util::require_session(dashboard)?;
            if dashboard.check_auth_state().await {
                output::notice("Session is valid", global.quiet);
                Ok(())
            } else {
                Err(CliError::AuthFailed {
                    message: "Stored session is no longer valid".into(),
                })
            }
        }

        AuthCommand::Whoami { user_id } => {
            let user = dashboard.fetch_user_profile(user_id.as_deref()).await?;
            render_user(&user, global)
        }

        AuthCommand::UpdateProfile {
            first_name,
            last_name,
            email,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                email,
                ..ProfileUpdate::default()
            };
            let user = dashboard.update_user_profile(&update).await?;
            render_user(&user, global)
        }

        AuthCommand::ChangePassword => {
            let form = PasswordChangeForm {
                current_password: util::password_or_prompt(None, "Current password: ")?,
                new_password: util::password_or_prompt(None, "New password: ")?,
                confirm_password: util::password_or_prompt(None, "Confirm new password: ")?,
            };
            dashboard.change_password(&form).await?;
            output::notice("Password changed", global.quiet);
            Ok(())
        }

        AuthCommand::ForgotPassword { email } => {
            let reply = dashboard.forgot_password(&email).await?;
            let message = reply.unwrap_or_else(|| format!("Reset instructions sent to {email}"));
            output::notice(&message, global.quiet);
            Ok(())
        }
    }
}
