//! Test utilities for database and HTTP testing.
//!
//! In-memory SQLite with migrations applied, fake identity and storage
//! adapters, and helpers for driving the router with `oneshot`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use eventosnow::{
    config::AppConfig,
    identity::{AuthTokens, IdentityError, IdentityProvider},
    models::company,
    repositories::{AccountRepository, NewCompany},
    server::{AppState, create_app},
    storage::{ObjectStorage, StorageError},
    validation::AddressInput,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const COOKIE_NAME: &str = "eventosnow-auth-token";
pub const TEST_BUCKET_URL: &str = "https://bucket.test";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Identity provider double. Every call is recorded by operation name.
pub struct FakeIdentity {
    pub subject: String,
    pub tokens: Option<AuthTokens>,
    pub failure: Option<IdentityError>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            tokens: Some(AuthTokens {
                access_token: Some(session_token(subject)),
                id_token: Some("id-token".to_string()),
                refresh_token: Some("refresh-token".to_string()),
                expires_in: Some(3600),
                token_type: Some("Bearer".to_string()),
            }),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: IdentityError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new("unused")
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &str) -> Result<(), IdentityError> {
        self.calls.lock().unwrap().push(operation.to_string());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<String, IdentityError> {
        self.record("sign_up")?;
        Ok(self.subject.clone())
    }

    async fn confirm_sign_up(&self, _email: &str, _code: &str) -> Result<(), IdentityError> {
        self.record("confirm_sign_up")
    }

    async fn initiate_auth(
        &self,
        _email: &str,
        _password: &str,
    ) -> Result<Option<AuthTokens>, IdentityError> {
        self.record("initiate_auth")?;
        Ok(self.tokens.clone())
    }

    async fn forgot_password(&self, _email: &str) -> Result<(), IdentityError> {
        self.record("forgot_password")
    }

    async fn confirm_forgot_password(
        &self,
        _email: &str,
        _code: &str,
        _password: &str,
    ) -> Result<(), IdentityError> {
        self.record("confirm_forgot_password")
    }
}

/// Object storage double that keeps every uploaded key, or rejects all uploads.
#[derive(Default)]
pub struct FakeStorage {
    pub fail: bool,
    pub uploads: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        key: &str,
        _content_type: &str,
        _body: Bytes,
    ) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Rejected {
                status: 503,
                code: "SlowDown".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(format!("{TEST_BUCKET_URL}/{key}"))
    }
}

pub fn test_state(
    db: DatabaseConnection,
    identity: Arc<FakeIdentity>,
    storage: Arc<FakeStorage>,
) -> AppState {
    let config = AppConfig {
        profile: "test".to_string(),
        ..AppConfig::default()
    };
    AppState {
        config: Arc::new(config),
        db,
        identity,
        storage,
    }
}

pub fn test_app(
    db: DatabaseConnection,
    identity: Arc<FakeIdentity>,
    storage: Arc<FakeStorage>,
) -> Router {
    create_app(test_state(db, identity, storage))
}

/// An access token whose only meaningful claim is `sub`.
pub fn session_token(subject: &str) -> String {
    encode(
        &Header::default(),
        &json!({ "sub": subject, "token_use": "access" }),
        &EncodingKey::from_secret(b"issued-by-the-provider"),
    )
    .unwrap()
}

pub fn session_cookie(subject: &str) -> String {
    format!("{COOKIE_NAME}={}", session_token(subject))
}

pub fn test_address() -> AddressInput {
    AddressInput {
        street: "Rua das Flores".to_string(),
        number: Some("100".to_string()),
        complement: None,
        neighborhood: "Centro".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
        country: "Brasil".to_string(),
        zip_code: "01001-000".to_string(),
    }
}

/// Registers a company owned by `subject` directly through the repository.
pub async fn seed_company(db: &DatabaseConnection, subject: &str) -> Result<company::Model> {
    let company = AccountRepository::new(db)
        .register_company(
            subject,
            NewCompany {
                name: "Acme Eventos".to_string(),
                document: "12.345.678/0001-90".to_string(),
                owner: "Maria Silva".to_string(),
                email: format!("{subject}@acme.com.br"),
                phone: "11999990000".to_string(),
            },
            test_address(),
        )
        .await?;
    Ok(company)
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: "eventosnow-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Returns the `Content-Type` header value and the finished body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// A complete, valid event form starting in ten days.
pub fn event_form(slug: &str) -> MultipartBuilder {
    let start = (Utc::now() + Duration::days(10)).to_rfc3339();
    let end = (Utc::now() + Duration::days(11)).to_rfc3339();

    MultipartBuilder::new()
        .text("name", "Festa de Lançamento")
        .text("description", "Lançamento do produto")
        .text("slug", slug)
        .text("addressZipCode", "01001-000")
        .text("addressStreet", "Praça da Sé")
        .text("addressNumber", "1")
        .text("addressNeighborhood", "Sé")
        .text("addressCity", "São Paulo")
        .text("addressState", "SP")
        .text("addressCountry", "Brasil")
        .text("startDate", &start)
        .text("endDate", &end)
        .text("confirmationType", "email")
        .text("hasGift", "true")
        .text("giftDescription", "Camiseta")
        .text("hasPrize", "false")
}

pub fn multipart_request(method: &str, uri: &str, cookie: &str, form: MultipartBuilder) -> Request<Body> {
    let (content_type, body) = form.finish();
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Sends `request` through the router and decodes the JSON body (`Null` when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}
