//! Object-storage adapter for event logos.

pub mod s3;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

pub use s3::S3Storage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not configured: {0}")]
    Configuration(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("upload rejected with status {status}: {code}")]
    Rejected { status: u16, code: String },
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `body` under `key` and returns the object's public URL.
    async fn put_object(
        &self,
        key: &str,
        content_type: &str,
        body: Bytes,
    ) -> Result<String, StorageError>;
}

/// `events/{event_id}.{extension}`
pub fn event_logo_key(event_id: Uuid, extension: &str) -> String {
    format!("events/{event_id}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_key_is_scoped_by_event() {
        let id = Uuid::parse_str("7f1b6a0e-3c1d-4e55-9a0e-0c2b1f7d9a11").unwrap();
        assert_eq!(
            event_logo_key(id, "png"),
            "events/7f1b6a0e-3c1d-4e55-9a0e-0c2b1f7d9a11.png"
        );
    }
}
