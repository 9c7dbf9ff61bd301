//! Shared helpers for command handlers.

use std::io::IsTerminal;

use secrecy::SecretString;

use smartdash_core::Dashboard;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Use `given` when present, otherwise prompt without echo.
pub fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<SecretString, CliError> {
    match given {
        Some(password) => Ok(SecretString::from(password)),
        None => rpassword::prompt_password(prompt)
            .map(SecretString::from)
            .map_err(prompt_err),
    }
}

/// Fail early with a sign-in hint when no session is stored.
pub fn require_session(dashboard: &Dashboard) -> Result<(), CliError> {
    if dashboard.store().auth().is_authenticated {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}
