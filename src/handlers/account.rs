//! # Account API Handlers
//!
//! Registration, confirmation, login, password recovery and logout. Every
//! handler validates its payload first and touches nothing when validation
//! fails; provider failures are answered with the translated message.

use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{UNKNOWN_USER, session_subject};
use crate::config::AppConfig;
use crate::error::{ApiError, bad_request, not_found};
use crate::handlers::types::{CompanyDto, CompanyResponse, EmailResponse, LoginResponse, SuccessResponse};
use crate::identity::IdentityError;
use crate::repositories::{AccountRepository, NewCompany};
use crate::server::AppState;
use crate::validation::{
    ConfirmRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    validate_request,
};

fn identity_failure(operation: &'static str, email: &str, error: IdentityError) -> ApiError {
    tracing::warn!(
        operation,
        email = %email,
        error_name = %error.name,
        error_message = %error.message,
        status = ?error.status,
        "identity provider call failed"
    );
    error.into()
}

/// Session cookie carrying the access token.
pub(crate) fn session_cookie(config: &AppConfig, access_token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(config.auth_cookie_name.clone(), access_token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(config.secure_cookies());
    cookie.set_max_age(time::Duration::seconds(config.auth_cookie_max_age_seconds));
    cookie
}

/// Register a company account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, confirmation code sent", body = EmailResponse),
        (status = 400, description = "Validation or provider failure", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    let cognito_id = state
        .identity
        .sign_up(&request.email, &request.password)
        .await
        .map_err(|e| identity_failure("sign_up", &request.email, e))?;

    let address = request.address();
    let company = NewCompany {
        name: request.company_name,
        document: request.company_document,
        owner: request.company_owner,
        email: request.email.clone(),
        phone: request.company_phone,
    };

    // The provider account is left in place when the local insert fails
    let company = AccountRepository::new(&state.db)
        .register_company(&cognito_id, company, address)
        .await
        .map_err(|e| {
            tracing::error!(cognito_id = %cognito_id, error = %e, "failed to store registered company");
            bad_request(&e.to_string())
        })?;

    tracing::info!(company_id = %company.id, "company registered");
    Ok(Json(EmailResponse::ok(request.email)))
}

/// Confirm a registration with the emailed code
#[utoipa::path(
    post,
    path = "/auth/confirm",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Account confirmed", body = EmailResponse),
        (status = 400, description = "Validation or provider failure", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn confirm(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    state
        .identity
        .confirm_sign_up(&request.email, &request.code)
        .await
        .map_err(|e| identity_failure("confirm_sign_up", &request.email, e))?;

    Ok(Json(EmailResponse::ok(request.email)))
}

/// Log in with email and password
///
/// Sets the session cookie to the access token when the provider issues one.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse, headers(
            ("Set-Cookie", description = "Session cookie holding the access token")
        )),
        (status = 400, description = "Validation or provider failure", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    let tokens = state
        .identity
        .initiate_auth(&request.email, &request.password)
        .await
        .map_err(|e| identity_failure("initiate_auth", &request.email, e))?;

    let access_token = tokens.as_ref().and_then(|t| t.access_token.clone());
    let jar = match access_token {
        Some(token) => jar.add(session_cookie(&state.config, token)),
        None => {
            tracing::info!(email = %request.email, "login answered without an access token");
            jar
        }
    };

    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            email: request.email,
            tokens,
        }),
    ))
}

/// Request a password reset code
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset code sent", body = EmailResponse),
        (status = 400, description = "Validation or provider failure", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    state
        .identity
        .forgot_password(&request.email)
        .await
        .map_err(|e| identity_failure("forgot_password", &request.email, e))?;

    Ok(Json(EmailResponse::ok(request.email)))
}

/// Set a new password with the reset code
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = EmailResponse),
        (status = 400, description = "Validation or provider failure", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = payload?;
    validate_request(&request)?;

    state
        .identity
        .confirm_forgot_password(&request.email, &request.code, &request.password)
        .await
        .map_err(|e| identity_failure("confirm_forgot_password", &request.email, e))?;

    Ok(Json(EmailResponse::ok(request.email)))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = SuccessResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    // Sent whether or not the request carried the cookie
    let mut cookie = Cookie::new(state.config.auth_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.make_removal();
    (jar.add(cookie), Json(SuccessResponse::ok()))
}

/// Company of the current session, read straight from the cookie
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Company of the logged-in account", body = CompanyResponse),
        (status = 401, description = "Missing or unreadable session cookie", body = ApiError),
        (status = 404, description = "Unknown account", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<CompanyResponse>, ApiError> {
    let cognito_id = session_subject(&jar, &state.config.auth_cookie_name)?;
    let accounts = AccountRepository::new(&state.db);

    if accounts.find_credential(&cognito_id).await?.is_none() {
        tracing::warn!(cognito_id = %cognito_id, "no credential for session subject");
        return Err(not_found(UNKNOWN_USER));
    }

    let company = accounts.find_company_for_subject(&cognito_id).await?;
    Ok(Json(CompanyResponse {
        success: true,
        company: company.map(CompanyDto::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_carries_configured_attributes() {
        let config = AppConfig::default();
        let cookie = session_cookie(&config, "tok".to_string());

        assert_eq!(cookie.name(), "eventosnow-auth-token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(259_200)));
    }

    #[test]
    fn session_cookie_is_secure_in_production() {
        let config = AppConfig {
            profile: "production".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(session_cookie(&config, "tok".into()).secure(), Some(true));
    }
}
