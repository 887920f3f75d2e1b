//! S3-backed logo storage.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::http::HttpResponse,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use axum::body::Bytes;

use super::{ObjectStorage, StorageError};
use crate::config::AppConfig;

const CREDENTIALS_SOURCE: &str = "eventosnow-config";

pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    /// Path-style base URL replacing the virtual-hosted AWS endpoint
    endpoint: Option<String>,
}

impl S3Storage {
    /// Builds the client from the shared SDK config. Explicit keys, when
    /// given, take precedence over the default provider chain.
    pub fn new(
        sdk_config: &SdkConfig,
        bucket: String,
        credentials: Option<Credentials>,
        endpoint: Option<String>,
    ) -> Self {
        let endpoint = endpoint.map(|e| e.trim_end_matches('/').to_string());

        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(credentials) = credentials {
            builder = builder.credentials_provider(credentials);
        }
        if let Some(endpoint) = &endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let region = sdk_config
            .region()
            .map(|region| region.to_string())
            .unwrap_or_default();

        Self {
            client: Client::from_conf(builder.build()),
            bucket,
            region,
            endpoint,
        }
    }

    pub fn from_config(sdk_config: &SdkConfig, config: &AppConfig) -> Self {
        let credentials = match (&config.s3_access_key_id, &config.s3_secret_access_key) {
            (Some(id), Some(secret)) => Some(Credentials::new(
                id.clone(),
                secret.clone(),
                None,
                None,
                CREDENTIALS_SOURCE,
            )),
            _ => None,
        };

        Self::new(
            sdk_config,
            config.s3_bucket.clone().unwrap_or_default(),
            credentials,
            config.s3_endpoint.clone(),
        )
    }

    /// Public URL of `key`.
    pub fn object_url(&self, key: &str) -> String {
        let key = encode_path(key);
        match &self.endpoint {
            Some(endpoint) => format!("{endpoint}/{}/{key}", self.bucket),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.region
            ),
        }
    }
}

fn upload_error(key: &str, error: SdkError<PutObjectError, HttpResponse>) -> StorageError {
    let status = error.raw_response().map(|response| response.status().as_u16());

    match (error.as_service_error(), status) {
        (Some(service_error), Some(status)) => {
            let code = service_error.code().unwrap_or("Unknown").to_string();
            tracing::error!(key, status, code = %code, "object upload rejected");
            StorageError::Rejected { status, code }
        }
        _ => {
            let message = DisplayErrorContext(&error).to_string();
            tracing::error!(key, error = %message, "object upload failed");
            StorageError::Network(message)
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StorageError> {
        if self.bucket.is_empty() {
            return Err(StorageError::Configuration("bucket name is empty".into()));
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| upload_error(key, e))?;

        Ok(self.object_url(key))
    }
}

/// Percent-encodes everything outside the unreserved set, keeping `/`.
fn encode_path(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::static_sdk_config;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, header_exists, method, path},
    };

    fn storage(endpoint: Option<String>) -> S3Storage {
        S3Storage::new(
            &static_sdk_config(),
            "eventosnow".to_string(),
            None,
            endpoint,
        )
    }

    #[test]
    fn public_url_is_virtual_hosted() {
        assert_eq!(
            storage(None).object_url("events/abc.png"),
            "https://eventosnow.s3.us-east-2.amazonaws.com/events/abc.png"
        );
    }

    #[test]
    fn endpoint_override_uses_path_style() {
        assert_eq!(
            storage(Some("http://localhost:4566/".to_string())).object_url("events/abc.png"),
            "http://localhost:4566/eventosnow/events/abc.png"
        );
    }

    #[test]
    fn key_is_percent_encoded() {
        assert_eq!(encode_path("events/a b+c.png"), "events/a%20b%2Bc.png");
    }

    #[tokio::test]
    async fn put_object_returns_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/eventosnow/events/abc.png"))
            .and(header("content-type", "image/png"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = storage(Some(server.uri()))
            .put_object("events/abc.png", "image/png", Bytes::from_static(b"logo"))
            .await
            .unwrap();
        assert_eq!(url, format!("{}/eventosnow/events/abc.png", server.uri()));
    }

    #[tokio::test]
    async fn rejected_upload_carries_status_and_code() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
                 <Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>",
            ))
            .mount(&server)
            .await;

        let error = storage(Some(server.uri()))
            .put_object("events/abc.png", "image/png", Bytes::from_static(b"logo"))
            .await
            .unwrap_err();
        match error {
            StorageError::Rejected { status, code } => {
                assert_eq!(status, 403);
                assert_eq!(code, "AccessDenied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_bucket_is_a_configuration_error() {
        let s3 = S3Storage::new(&static_sdk_config(), String::new(), None, None);
        let error = s3
            .put_object("events/abc.png", "image/png", Bytes::from_static(b"logo"))
            .await
            .unwrap_err();
        assert!(matches!(error, StorageError::Configuration(_)));
    }
}
