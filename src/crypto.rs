//! Keyed hashing for the identity provider integrity code.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
#[error("invalid HMAC key")]
pub struct InvalidKey;

/// HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, InvalidKey> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| InvalidKey)?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
