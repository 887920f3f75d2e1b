//! Cognito user-pool client.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::{
    Client,
    config::http::HttpResponse,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    types::{AuthFlowType, AuthenticationResultType},
};

use super::{AuthTokens, IdentityError, IdentityProvider, secret_hash};
use crate::config::AppConfig;

pub struct CognitoClient {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl From<&AuthenticationResultType> for AuthTokens {
    fn from(result: &AuthenticationResultType) -> Self {
        Self {
            access_token: result.access_token().map(str::to_string),
            id_token: result.id_token().map(str::to_string),
            refresh_token: result.refresh_token().map(str::to_string),
            expires_in: Some(i64::from(result.expires_in())),
            token_type: result.token_type().map(str::to_string),
        }
    }
}

impl CognitoClient {
    pub fn new(
        sdk_config: &SdkConfig,
        client_id: String,
        client_secret: String,
        endpoint: Option<String>,
    ) -> Self {
        let mut builder = aws_sdk_cognitoidentityprovider::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            client_id,
            client_secret,
        }
    }

    pub fn from_config(sdk_config: &SdkConfig, config: &AppConfig) -> Self {
        Self::new(
            sdk_config,
            config.cognito_client_id.clone().unwrap_or_default(),
            config.cognito_client_secret.clone().unwrap_or_default(),
            config.cognito_endpoint.clone(),
        )
    }

    fn secret_hash(&self, username: &str) -> Result<String, IdentityError> {
        secret_hash(username, &self.client_id, &self.client_secret)
    }
}

/// Error name from the service error code; transport failures become `NetworkError`.
fn provider_error<E>(operation: &'static str, error: SdkError<E, HttpResponse>) -> IdentityError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = error.raw_response().map(|response| response.status().as_u16());

    let identity_error = match error.as_service_error() {
        Some(service_error) => IdentityError::new(
            service_error.code().unwrap_or("UnknownError"),
            service_error
                .message()
                .unwrap_or("An unknown error occurred"),
        ),
        None => IdentityError::new("NetworkError", DisplayErrorContext(&error).to_string()),
    };
    let identity_error = match status {
        Some(status) => identity_error.with_status(status),
        None => identity_error,
    };

    tracing::error!(
        operation,
        name = %identity_error.name,
        message = %identity_error.message,
        code = ?identity_error.status,
        "identity provider call failed"
    );
    identity_error
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let output = self
            .client
            .sign_up()
            .client_id(&self.client_id)
            .username(email)
            .password(password)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| provider_error("SignUp", e))?;

        let user_sub = output.user_sub();
        if user_sub.is_empty() {
            tracing::warn!("sign-up response carried no user sub");
            return Err(IdentityError::new("Error", "Failed to get Cognito User ID"));
        }
        Ok(user_sub.to_string())
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        self.client
            .confirm_sign_up()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| provider_error("ConfirmSignUp", e))?;
        Ok(())
    }

    async fn initiate_auth(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthTokens>, IdentityError> {
        let output = self
            .client
            .initiate_auth()
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .client_id(&self.client_id)
            .auth_parameters("USERNAME", email)
            .auth_parameters("PASSWORD", password)
            .auth_parameters("SECRET_HASH", self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| provider_error("InitiateAuth", e))?;

        if let Some(challenge) = output.challenge_name() {
            tracing::info!(challenge = %challenge.as_str(), "login answered with a challenge");
        }

        Ok(output.authentication_result().map(AuthTokens::from))
    }

    async fn forgot_password(&self, email: &str) -> Result<(), IdentityError> {
        self.client
            .forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| provider_error("ForgotPassword", e))?;
        Ok(())
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        self.client
            .confirm_forgot_password()
            .client_id(&self.client_id)
            .username(email)
            .confirmation_code(code)
            .password(password)
            .secret_hash(self.secret_hash(email)?)
            .send()
            .await
            .map_err(|e| provider_error("ConfirmForgotPassword", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::static_sdk_config;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method},
    };

    fn client(server: &MockServer) -> CognitoClient {
        CognitoClient::new(
            &static_sdk_config(),
            "client-id".to_string(),
            "client-secret".to_string(),
            Some(server.uri()),
        )
    }

    fn target(operation: &str) -> String {
        format!("AWSCognitoIdentityProviderService.{operation}")
    }

    #[tokio::test]
    async fn sign_up_returns_user_sub() {
        let server = MockServer::start().await;
        let expected_hash = secret_hash("a@b.com", "client-id", "client-secret").unwrap();

        Mock::given(method("POST"))
            .and(header("x-amz-target", target("SignUp").as_str()))
            .and(body_partial_json(json!({
                "ClientId": "client-id",
                "Username": "a@b.com",
                "SecretHash": expected_hash,
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-amz-json-1.1")
                    .set_body_json(json!({
                        "UserSub": "sub-123",
                        "UserConfirmed": false
                    })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let sub = client(&server).sign_up("a@b.com", "Abcdef1!").await.unwrap();
        assert_eq!(sub, "sub-123");
    }

    #[tokio::test]
    async fn provider_errors_carry_name_and_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("content-type", "application/x-amz-json-1.1")
                    .set_body_json(json!({
                        "__type": "NotAuthorizedException",
                        "message": "Incorrect username or password."
                    })),
            )
            .mount(&server)
            .await;

        let error = client(&server)
            .initiate_auth("a@b.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(error.name, "NotAuthorizedException");
        assert_eq!(error.message, "Incorrect username or password.");
        assert_eq!(error.status, Some(400));
        assert_eq!(error.user_message(), "E-mail ou senha incorretos");
    }

    #[tokio::test]
    async fn namespaced_error_type_is_reduced_to_its_name() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", target("ConfirmSignUp").as_str()))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("content-type", "application/x-amz-json-1.1")
                    .set_body_json(json!({
                        "__type": "com.amazonaws.cognito#CodeMismatchException",
                        "message": "Invalid code provided"
                    })),
            )
            .mount(&server)
            .await;

        let error = client(&server)
            .confirm_sign_up("a@b.com", "000000")
            .await
            .unwrap_err();
        assert_eq!(error.name, "CodeMismatchException");
        assert_eq!(error.user_message(), "Código informado está incorreto");
    }

    #[tokio::test]
    async fn login_returns_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", target("InitiateAuth").as_str()))
            .and(body_partial_json(json!({
                "AuthFlow": "USER_PASSWORD_AUTH",
                "AuthParameters": { "USERNAME": "a@b.com", "PASSWORD": "Abcdef1!" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-amz-json-1.1")
                    .set_body_json(json!({
                        "AuthenticationResult": {
                            "AccessToken": "access",
                            "IdToken": "id",
                            "RefreshToken": "refresh",
                            "ExpiresIn": 3600,
                            "TokenType": "Bearer"
                        },
                        "ChallengeParameters": {}
                    })),
            )
            .mount(&server)
            .await;

        let tokens = client(&server)
            .initiate_auth("a@b.com", "Abcdef1!")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tokens.access_token.as_deref(), Some("access"));
        assert_eq!(tokens.expires_in, Some(3600));
    }

    #[tokio::test]
    async fn login_challenge_yields_no_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", target("InitiateAuth").as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/x-amz-json-1.1")
                    .set_body_json(json!({
                        "ChallengeName": "NEW_PASSWORD_REQUIRED",
                        "Session": "opaque",
                        "ChallengeParameters": {}
                    })),
            )
            .mount(&server)
            .await;

        let tokens = client(&server)
            .initiate_auth("a@b.com", "Abcdef1!")
            .await
            .unwrap();
        assert!(tokens.is_none());
    }

    #[tokio::test]
    async fn empty_success_body_is_accepted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", target("ForgotPassword").as_str()))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        client(&server).forgot_password("a@b.com").await.unwrap();
    }
}
