//! Identity-provider adapter.
//!
//! Account lifecycle (sign-up, confirmation, login, password reset) is delegated
//! to a managed user pool. Handlers depend on the [`IdentityProvider`] trait; the
//! production implementation is [`CognitoClient`].

pub mod cognito;
pub mod messages;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::crypto::hmac_sha256;
use crate::error::{ApiError, bad_request};

pub use cognito::CognitoClient;

/// Tokens issued by a successful login, in the provider's field naming.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct AuthTokens {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// A failed provider call. `name` is the provider's error type
/// (e.g. `UsernameExistsException`) and drives the translated message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct IdentityError {
    pub name: String,
    pub message: String,
    pub status: Option<u16>,
}

impl IdentityError {
    pub fn new<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// pt-BR message for known error names, the provider's message otherwise.
    pub fn user_message(&self) -> String {
        messages::translate(&self.name)
            .map(str::to_string)
            .unwrap_or_else(|| self.message.clone())
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        bad_request(&error.user_message()).with_error_type(error.name)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the user and returns the provider's subject id for it.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError>;

    /// Password login. `None` when the provider answers with a challenge instead of tokens.
    async fn initiate_auth(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthTokens>, IdentityError>;

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError>;

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        password: &str,
    ) -> Result<(), IdentityError>;
}

/// `base64(HMAC-SHA256(client_secret, username || client_id))`, sent with every call
/// made by a client that has a secret.
pub fn secret_hash(
    username: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String, IdentityError> {
    let message = format!("{username}{client_id}");
    let mac = hmac_sha256(client_secret.as_bytes(), message.as_bytes())
        .map_err(|e| IdentityError::new("SecretHashError", e.to_string()))?;
    Ok(general_purpose::STANDARD.encode(mac))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn secret_hash_is_base64_hmac_of_username_and_client() {
        let expected = general_purpose::STANDARD
            .encode(hmac_sha256(b"client-secret", b"a@b.comclient-id").unwrap());

        assert_eq!(
            secret_hash("a@b.com", "client-id", "client-secret").unwrap(),
            expected
        );
        // 32-byte digest encodes to 44 base64 chars
        assert_eq!(expected.len(), 44);
    }

    #[test]
    fn known_errors_are_translated() {
        let error = IdentityError::new("CodeMismatchException", "Invalid code provided");
        assert_eq!(error.user_message(), "Código informado está incorreto");

        let api: ApiError = error.into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error_type.as_deref(), Some("CodeMismatchException"));
    }

    #[test]
    fn unknown_errors_keep_provider_message() {
        let error = IdentityError::new("UsernameExistsException", "User already exists");
        assert_eq!(error.user_message(), "User already exists");
    }
}
