//! # Session Authentication
//!
//! Resolves the session cookie into the owning company for `/dashboard` routes.
//!
//! The cookie holds the access token issued by the identity provider at login.
//! Its subject claim is read without re-verifying the signature or expiry: the
//! provider established authenticity when it issued the token.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderName, HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, not_found, unauthorized};
use crate::repositories::AccountRepository;
use crate::server::AppState;

pub const COGNITO_ID_HEADER: HeaderName = HeaderName::from_static("x-cognito-id");

const MISSING_TOKEN: &str = "Token não encontrado";
const INVALID_TOKEN: &str = "Token inválido";
pub const UNKNOWN_USER: &str = "Usuário não encontrado";

/// Company resolved from the session, available to every dashboard handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyContext {
    pub cognito_id: String,
    pub company_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct SubjectClaims {
    sub: Option<String>,
}

/// Reads the `sub` claim of a JWT without verifying it.
pub fn decode_subject(token: &str) -> Option<String> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<SubjectClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.sub)
        .filter(|sub| !sub.is_empty())
}

/// Subject of the session cookie: 401 when the cookie is missing or has no subject.
pub fn session_subject(jar: &CookieJar, cookie_name: &str) -> Result<String, ApiError> {
    let token = jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            tracing::warn!("session cookie not found");
            unauthorized(Some(MISSING_TOKEN))
        })?;

    decode_subject(&token).ok_or_else(|| {
        tracing::warn!("session token has no subject");
        unauthorized(Some(INVALID_TOKEN))
    })
}

/// Middleware guarding `/dashboard` routes.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cognito_id = session_subject(&jar, &state.config.auth_cookie_name)?;

    let company = AccountRepository::new(&state.db)
        .find_company_for_subject(&cognito_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(cognito_id = %cognito_id, "no company for session subject");
            not_found(UNKNOWN_USER)
        })?;

    tracing::debug!(company_id = %company.id, "session resolved");

    match HeaderValue::from_str(&cognito_id) {
        Ok(value) => {
            request.headers_mut().insert(COGNITO_ID_HEADER, value);
        }
        Err(_) => {
            tracing::warn!(cognito_id = %cognito_id, "session subject is not a valid header value");
        }
    }
    request.extensions_mut().insert(CompanyContext {
        cognito_id,
        company_id: company.id,
    });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for CompanyContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CompanyContext>()
            .cloned()
            .ok_or_else(|| unauthorized(Some(MISSING_TOKEN)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, header::COOKIE};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn token(claims: serde_json::Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"signed-elsewhere"),
        )
        .unwrap()
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn subject_is_read_without_verification() {
        // expired and signed with a key this service never sees
        let jwt = token(json!({ "sub": "abc-123", "exp": 1 }));
        assert_eq!(decode_subject(&jwt).as_deref(), Some("abc-123"));
    }

    #[test]
    fn token_without_subject_yields_none() {
        assert_eq!(decode_subject(&token(json!({ "email": "a@b.com" }))), None);
        assert_eq!(decode_subject("not-a-jwt"), None);
    }

    #[test]
    fn missing_cookie_is_unauthorized() {
        let error = session_subject(&CookieJar::new(), "eventosnow-auth-token").unwrap_err();
        assert_eq!(error.status, axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(&*error.error, MISSING_TOKEN);
    }

    #[test]
    fn garbage_cookie_is_invalid_token() {
        let jar = jar_with("eventosnow-auth-token=garbage");
        let error = session_subject(&jar, "eventosnow-auth-token").unwrap_err();
        assert_eq!(&*error.error, INVALID_TOKEN);
    }

    #[test]
    fn cookie_subject_is_extracted() {
        let jwt = token(json!({ "sub": "sub-9" }));
        let jar = jar_with(&format!("other=1; eventosnow-auth-token={jwt}"));
        assert_eq!(
            session_subject(&jar, "eventosnow-auth-token").unwrap(),
            "sub-9"
        );
    }
}
