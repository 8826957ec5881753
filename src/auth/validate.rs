//! Client-side registration checks

use regex::Regex;
use std::fmt;

use crate::config::RegistrationConfig;
use crate::error::Error;

/// Registration form input
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Per-field problems found in a [`RegistrationForm`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.confirm_password.is_none()
    }

    fn messages(&self) -> impl Iterator<Item = &str> {
        [
            &self.name,
            &self.email,
            &self.password,
            &self.confirm_password,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.messages().collect::<Vec<_>>().join("; ");
        f.write_str(&joined)
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors.to_string())
    }
}

/// Check a registration form, collecting every field error at once
pub fn validate_registration(
    form: &RegistrationForm,
    rules: &RegistrationConfig,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = form.name.trim();
    if name.is_empty() {
        errors.name = Some("Name is required".to_string());
    } else if name.chars().count() < rules.min_name_len {
        errors.name = Some(format!(
            "Name must be at least {} characters",
            rules.min_name_len
        ));
    }

    if form.email.is_empty() {
        errors.email = Some("Email is required".to_string());
    } else if !email_pattern(rules.email_domain.as_deref()).is_match(&form.email) {
        errors.email = Some(match &rules.email_domain {
            Some(domain) => format!("Please enter a valid @{} email", domain),
            None => "Please enter a valid email".to_string(),
        });
    }

    if form.password.is_empty() {
        errors.password = Some("Password is required".to_string());
    } else if form.password.chars().count() < rules.min_password_len {
        errors.password = Some(format!(
            "Password must be at least {} characters",
            rules.min_password_len
        ));
    }

    if form.confirm_password != form.password {
        errors.confirm_password = Some("Passwords do not match".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn email_pattern(domain: Option<&str>) -> Regex {
    let pattern = match domain {
        Some(domain) => format!(r"^[^\s@]+@{}$", regex::escape(domain)),
        None => r"^[^\s@]+@[^\s@]+\.[^\s@]+$".to_string(),
    };
    // Built from an escaped literal, so compilation cannot fail
    Regex::new(&pattern).expect("Invalid email pattern - this is a bug in the codebase")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn campus_rules() -> RegistrationConfig {
        RegistrationConfig {
            email_domain: Some("stis.ac.id".to_string()),
            ..RegistrationConfig::default()
        }
    }

    #[test]
    fn test_valid_form() {
        let f = form("Dodi", "222212572@stis.ac.id", "password1", "password1");
        assert!(validate_registration(&f, &campus_rules()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let f = form("", "", "", "x");
        let errors = validate_registration(&f, &campus_rules()).unwrap_err();
        assert_eq!(errors.name.as_deref(), Some("Name is required"));
        assert_eq!(errors.email.as_deref(), Some("Email is required"));
        assert_eq!(errors.password.as_deref(), Some("Password is required"));
        assert_eq!(errors.confirm_password.as_deref(), Some("Passwords do not match"));
    }

    #[test]
    fn test_short_name_and_password() {
        let f = form("Al", "al@stis.ac.id", "short", "short");
        let errors = validate_registration(&f, &campus_rules()).unwrap_err();
        assert!(errors.name.unwrap().contains("at least 3"));
        assert!(errors.password.unwrap().contains("at least 8"));
        assert!(errors.email.is_none());
    }

    #[test]
    fn test_domain_restriction() {
        let f = form("Andi", "andi@gmail.com", "password1", "password1");
        let errors = validate_registration(&f, &campus_rules()).unwrap_err();
        assert!(errors.email.is_some());

        let open = RegistrationConfig::default();
        assert!(validate_registration(&f, &open).is_ok());
    }

    #[test]
    fn test_domain_is_not_a_regex() {
        // "stis.ac.id" must not match "stisXacXid"
        let f = form("Andi", "andi@stisxacxid", "password1", "password1");
        assert!(validate_registration(&f, &campus_rules()).is_err());
    }

    #[test]
    fn test_errors_convert_to_validation_error() {
        let f = form("", "a@b.co", "password1", "password1");
        let err: Error = validate_registration(&f, &RegistrationConfig::default())
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Validation(msg) if msg == "Name is required"));
    }
}
