// ── Input validation ──
//
// Checks run before an intent dispatches anything. A failure here never
// reaches the gateway or a container.

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;
use crate::model::ProfileUpdate;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: SecretString,
}

/// Password change form.
#[derive(Debug, Clone)]
pub struct PasswordChangeForm {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

/// `local@domain.tld` with no whitespace, checked loosely.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !local.is_empty() && !host.is_empty() && !tld.is_empty()
}

fn require_email(email: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() {
        return Err(CoreError::validation("email", "Email is required"));
    }
    if !is_valid_email(email) {
        return Err(CoreError::validation("email", "Email is invalid"));
    }
    Ok(())
}

fn require_password(field: &'static str, password: &SecretString) -> Result<(), CoreError> {
    let len = password.expose_secret().chars().count();
    if len == 0 {
        return Err(CoreError::validation(field, "Password is required"));
    }
    if len < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(
            field,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

fn require_text(field: &'static str, label: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, format!("{label} is required")));
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &SecretString) -> Result<(), CoreError> {
    require_email(email)?;
    require_password("password", password)
}

pub fn validate_registration(form: &Registration) -> Result<(), CoreError> {
    require_text("first_name", "First name", &form.first_name)?;
    require_text("last_name", "Last name", &form.last_name)?;
    require_email(&form.email)?;
    require_password("password", &form.password)
}

pub fn validate_password_change(form: &PasswordChangeForm) -> Result<(), CoreError> {
    require_text(
        "current_password",
        "Current password",
        form.current_password.expose_secret(),
    )?;
    require_password("new_password", &form.new_password)?;
    if form.new_password.expose_secret() != form.confirm_password.expose_secret() {
        return Err(CoreError::validation(
            "confirm_password",
            "Passwords do not match",
        ));
    }
    Ok(())
}

/// Only the fields being changed are checked.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), CoreError> {
    if let Some(first) = &update.first_name {
        require_text("first_name", "First name", first)?;
    }
    if let Some(last) = &update.last_name {
        require_text("last_name", "Last name", last)?;
    }
    if let Some(email) = &update.email {
        require_email(email)?;
    }
    Ok(())
}

pub fn validate_forgot_password(email: &str) -> Result<(), CoreError> {
    require_email(email)
}

pub fn validate_reading(value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::validation("value", "Reading must be a finite number"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    fn field(err: CoreError) -> &'static str {
        match err {
            CoreError::ValidationFailed { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email(" ops@plant.example.org "));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn login_rules() {
        assert!(validate_login("a@b.com", &secret("password1")).is_ok());
        assert_eq!(
            field(validate_login("nope", &secret("password1")).unwrap_err()),
            "email"
        );
        assert_eq!(
            field(validate_login("a@b.com", &secret("short")).unwrap_err()),
            "password"
        );
    }

    #[test]
    fn registration_requires_names() {
        let form = Registration {
            first_name: " ".into(),
            last_name: "Lovelace".into(),
            email: "ada@x.io".into(),
            password: secret("analytical"),
        };
        assert_eq!(field(validate_registration(&form).unwrap_err()), "first_name");

        let form = Registration {
            first_name: "Ada".into(),
            ..form
        };
        assert!(validate_registration(&form).is_ok());
    }

    #[test]
    fn password_change_rules() {
        let form = |current: &str, new: &str, confirm: &str| PasswordChangeForm {
            current_password: secret(current),
            new_password: secret(new),
            confirm_password: secret(confirm),
        };
        assert!(validate_password_change(&form("old", "new-pass-1", "new-pass-1")).is_ok());
        assert_eq!(
            field(validate_password_change(&form("", "new-pass-1", "new-pass-1")).unwrap_err()),
            "current_password"
        );
        assert_eq!(
            field(validate_password_change(&form("old", "short", "short")).unwrap_err()),
            "new_password"
        );
        assert_eq!(
            field(validate_password_change(&form("old", "new-pass-1", "new-pass-2")).unwrap_err()),
            "confirm_password"
        );
    }

    #[test]
    fn profile_update_checks_present_fields_only() {
        assert!(validate_profile_update(&ProfileUpdate::default()).is_ok());
        let update = ProfileUpdate {
            email: Some("not-an-email".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(field(validate_profile_update(&update).unwrap_err()), "email");
    }

    #[test]
    fn readings_must_be_finite() {
        assert!(validate_reading(21.5).is_ok());
        assert!(validate_reading(f64::NAN).is_err());
        assert!(validate_reading(f64::INFINITY).is_err());
    }
}
