//! Request schemas and their conversion into API validation issues.
//!
//! Validation is total: every violated constraint of a request is reported,
//! each as a [`ValidationIssue`] keyed by the camelCase field name the client sent.

pub mod auth;
pub mod event_form;

use std::borrow::Cow;

use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::error::{ApiError, ValidationIssue, validation_failed};

pub use auth::{
    ConfirmRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
};
pub use event_form::{EventForm, EventInput, UploadedFile};

/// Address fields shared by registration and the event form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

pub const EMAIL_MESSAGE: &str = "Email inválido";
pub const PASSWORD_MIN_LENGTH: u64 = 6;
pub const PASSWORD_STRENGTH_MESSAGE: &str =
    "A senha deve ter 1 maiúscula, 1 minúscula, 1 número e 1 símbolo.";

/// Runs the derived rules of `request`, mapping failures to a 400 [`ApiError`].
pub fn validate_request<T: Validate>(request: &T) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|errors| validation_failed(issues_from(&errors)))
}

/// Flattens `validator` field errors into sorted issues.
pub fn issues_from(errors: &ValidationErrors) -> Vec<ValidationIssue> {
    let mut issues: Vec<ValidationIssue> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let path = vec![camel_case(&field.to_string())];
            field_errors.iter().map(move |error| issue(path.clone(), error))
        })
        .collect();
    issues.sort();
    issues
}

fn issue(path: Vec<String>, error: &ValidationError) -> ValidationIssue {
    ValidationIssue {
        path,
        code: error.code.to_string(),
        message: error
            .message
            .as_ref()
            .map(|message| message.to_string())
            .unwrap_or_else(|| error.code.to_string()),
    }
}

/// Builds a [`ValidationError`] carrying a user-facing message.
pub(crate) fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Password complexity: ASCII lowercase, uppercase, digit and a symbol
/// (anything outside `[A-Za-z0-9]`), over at least the minimum length.
///
/// A short password therefore fails both this rule and the length rule.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() as u64 >= PASSWORD_MIN_LENGTH;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_ascii_alphanumeric());

    if long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(rule_error("password_strength", PASSWORD_STRENGTH_MESSAGE))
    }
}

/// Email address whose domain is dotted and ends in an alphabetic TLD of
/// at least two letters. `user@localhost` is rejected.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    let has_tld = email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .is_some_and(|(_, tld)| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    if has_tld && email.validate_email() {
        Ok(())
    } else {
        Err(rule_error("email", EMAIL_MESSAGE))
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_cases_field_names() {
        assert_eq!(camel_case("repeat_password"), "repeatPassword");
        assert_eq!(camel_case("address_zip_code"), "addressZipCode");
        assert_eq!(camel_case("email"), "email");
    }

    #[test]
    fn password_strength_requires_every_class() {
        assert!(validate_password_strength("Abcdef1!").is_ok());
        assert!(validate_password_strength("abcdef1!").is_err());
        assert!(validate_password_strength("ABCDEF1!").is_err());
        assert!(validate_password_strength("Abcdefg!").is_err());
        assert!(validate_password_strength("Abcdefg1").is_err());
        assert!(validate_password_strength("Abcde_1").is_ok());
        assert!(validate_password_strength("Ab1!").is_err());
    }

    #[test]
    fn email_requires_dotted_domain_with_alphabetic_tld() {
        assert!(validate_email_address("contato@acme.com.br").is_ok());
        assert!(validate_email_address("a.b+tag@sub.example.io").is_ok());
        assert!(validate_email_address("a@b").is_err());
        assert!(validate_email_address("user@localhost").is_err());
        assert!(validate_email_address("a@b.c").is_err());
        assert!(validate_email_address("a@b.c0m").is_err());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("").is_err());

        let error = validate_email_address("a@b").unwrap_err();
        assert_eq!(error.code, "email");
        assert_eq!(error.message.as_deref(), Some(EMAIL_MESSAGE));
    }

    #[test]
    fn strength_error_carries_message() {
        let error = validate_password_strength("weak").unwrap_err();
        assert_eq!(error.code, "password_strength");
        assert_eq!(error.message.as_deref(), Some(PASSWORD_STRENGTH_MESSAGE));
    }
}
