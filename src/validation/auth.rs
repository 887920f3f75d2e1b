//! Account request bodies.
//!
//! Every field defaults to empty so a missing field is reported as a rule
//! violation instead of a deserialization failure.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{AddressInput, validate_email_address, validate_password_strength};

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 14, message = "CNPJ inválido"))]
    pub company_document: String,
    #[validate(length(min = 1, message = "Nome da empresa é obrigatório"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Responsável é obrigatório"))]
    pub company_owner: String,
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Telefone é obrigatório"))]
    pub company_phone: String,
    #[validate(length(min = 8, message = "CEP inválido"))]
    pub address_zip_code: String,
    #[validate(length(min = 1, message = "Rua é obrigatória"))]
    pub address_street: String,
    pub address_number: Option<String>,
    pub address_complement: Option<String>,
    #[validate(length(min = 1, message = "Bairro é obrigatório"))]
    pub address_neighborhood: String,
    #[validate(length(min = 1, message = "Cidade é obrigatória"))]
    pub address_city: String,
    #[validate(length(min = 1, message = "Estado é obrigatório"))]
    pub address_state: String,
    #[validate(length(min = 1, message = "País é obrigatório"))]
    pub address_country: String,
    #[validate(
        length(min = 6, message = "A senha deve ter no mínimo 6 caracteres"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub repeat_password: String,
}

impl RegisterRequest {
    pub fn address(&self) -> AddressInput {
        AddressInput {
            street: self.address_street.clone(),
            number: self.address_number.clone().filter(|n| !n.is_empty()),
            complement: self.address_complement.clone().filter(|c| !c.is_empty()),
            neighborhood: self.address_neighborhood.clone(),
            city: self.address_city.clone(),
            state: self.address_state.clone(),
            country: self.address_country.clone(),
            zip_code: self.address_zip_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Código de confirmação é obrigatório"))]
    pub code: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(custom(function = "validate_email_address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Código é obrigatório"))]
    pub code: String,
    #[validate(
        length(min = 6, message = "A senha deve ter no mínimo 6 caracteres"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    #[validate(must_match(other = "password", message = "As senhas não coincidem"))]
    pub repeat_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::issues_from;

    fn valid_registration() -> RegisterRequest {
        RegisterRequest {
            company_document: "12345678000190".to_string(),
            company_name: "Acme Eventos".to_string(),
            company_owner: "Maria Souza".to_string(),
            email: "a@b.com".to_string(),
            company_phone: "11999990000".to_string(),
            address_zip_code: "01001000".to_string(),
            address_street: "Praça da Sé".to_string(),
            address_number: Some("100".to_string()),
            address_complement: None,
            address_neighborhood: "Sé".to_string(),
            address_city: "São Paulo".to_string(),
            address_state: "SP".to_string(),
            address_country: "Brasil".to_string(),
            password: "Abcdef1!".to_string(),
            repeat_password: "Abcdef1!".to_string(),
        }
    }

    fn paths(errors: &validator::ValidationErrors) -> Vec<String> {
        issues_from(errors)
            .into_iter()
            .map(|issue| issue.path.join("."))
            .collect()
    }

    #[test]
    fn complete_registration_passes() {
        assert!(valid_registration().validate().is_ok());
    }

    #[test]
    fn mismatched_repeat_is_reported_on_repeat_password() {
        let request = RegisterRequest {
            repeat_password: "Abcdef1?".to_string(),
            ..valid_registration()
        };

        let issues = issues_from(&request.validate().unwrap_err());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["repeatPassword".to_string()]);
        assert_eq!(issues[0].message, "As senhas não coincidem");
    }

    #[test]
    fn reports_every_violation_at_once() {
        let request = RegisterRequest {
            company_document: "123".to_string(),
            email: "not-an-email".to_string(),
            password: "abc".to_string(),
            repeat_password: "abc".to_string(),
            ..valid_registration()
        };

        let errors = request.validate().unwrap_err();
        let paths = paths(&errors);
        assert!(paths.contains(&"companyDocument".to_string()));
        assert!(paths.contains(&"email".to_string()));
        // length and complexity both fail for a short weak password
        assert_eq!(paths.iter().filter(|p| *p == "password").count(), 2);
    }

    #[test]
    fn empty_body_fails_every_required_field() {
        let request: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let paths = paths(&errors);

        for field in [
            "companyDocument",
            "companyName",
            "companyOwner",
            "email",
            "companyPhone",
            "addressZipCode",
            "addressStreet",
            "addressNeighborhood",
            "addressCity",
            "addressState",
            "addressCountry",
            "password",
        ] {
            assert!(paths.contains(&field.to_string()), "missing issue for {field}");
        }
        assert!(!paths.contains(&"addressNumber".to_string()));
    }

    #[test]
    fn confirm_requires_code() {
        let request = ConfirmRequest {
            email: "a@b.com".to_string(),
            code: String::new(),
        };
        let issues = issues_from(&request.validate().unwrap_err());
        assert_eq!(issues[0].message, "Código de confirmação é obrigatório");
    }

    #[test]
    fn reset_password_applies_password_rules() {
        let request = ResetPasswordRequest {
            email: "a@b.com".to_string(),
            code: "123456".to_string(),
            password: "Abcdef1!".to_string(),
            repeat_password: "Abcdef1!".to_string(),
        };
        assert!(request.validate().is_ok());

        let weak = ResetPasswordRequest {
            password: "abcdefgh".to_string(),
            repeat_password: "abcdefgh".to_string(),
            ..request
        };
        let issues = issues_from(&weak.validate().unwrap_err());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "password_strength");
    }

    #[test]
    fn undotted_email_domain_is_rejected() {
        let request = ForgotPasswordRequest {
            email: "a@b".to_string(),
        };
        let issues = issues_from(&request.validate().unwrap_err());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, vec!["email".to_string()]);
        assert_eq!(issues[0].message, "Email inválido");
    }

    #[test]
    fn login_and_forgot_require_email() {
        let login = LoginRequest {
            email: String::new(),
            password: "x".to_string(),
        };
        assert!(login.validate().is_err());

        let forgot = ForgotPasswordRequest {
            email: "a@b.com".to_string(),
        };
        assert!(forgot.validate().is_ok());
    }
}
