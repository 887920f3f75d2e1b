//! Configuration loading for the eventosnow backend.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `EVENTOSNOW_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "EVENTOSNOW_";
const REDACTED: &str = "[REDACTED]";

/// Application configuration derived from `EVENTOSNOW_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Connection attempts at startup before giving up
    #[serde(default = "default_db_connect_retries")]
    pub db_connect_retries: u32,
    /// Delay before the second attempt; doubled after each failure
    #[serde(default = "default_db_connect_retry_delay_ms")]
    pub db_connect_retry_delay_ms: u64,
    #[serde(default = "default_aws_region")]
    pub aws_region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_client_secret: Option<String>,
    /// Overrides the regional identity-provider endpoint (local stacks, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_access_key_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_secret_access_key: Option<String>,
    /// Overrides the virtual-hosted bucket endpoint (local stacks, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_endpoint: Option<String>,
    #[serde(default = "default_auth_cookie_name")]
    pub auth_cookie_name: String,
    #[serde(default = "default_auth_cookie_max_age_seconds")]
    pub auth_cookie_max_age_seconds: i64,
    #[serde(default = "default_max_upload_body_bytes")]
    pub max_upload_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            db_connect_retries: default_db_connect_retries(),
            db_connect_retry_delay_ms: default_db_connect_retry_delay_ms(),
            aws_region: default_aws_region(),
            cognito_client_id: None,
            cognito_client_secret: None,
            cognito_endpoint: None,
            s3_bucket: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_endpoint: None,
            auth_cookie_name: default_auth_cookie_name(),
            auth_cookie_max_age_seconds: default_auth_cookie_max_age_seconds(),
            max_upload_body_bytes: default_max_upload_body_bytes(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Session cookies are only marked `Secure` in production.
    pub fn secure_cookies(&self) -> bool {
        self.profile == "production"
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        for secret in [
            &mut config.cognito_client_secret,
            &mut config.s3_access_key_id,
            &mut config.s3_secret_access_key,
        ] {
            if secret.is_some() {
                *secret = Some(REDACTED.to_string());
            }
        }
        if config.database_url.contains('@') {
            config.database_url = REDACTED.to_string();
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_cookie_name.trim().is_empty() {
            return Err(ConfigError::InvalidCookieName);
        }

        if self.db_connect_retries == 0 {
            return Err(ConfigError::InvalidConnectRetries);
        }

        if self.auth_cookie_max_age_seconds <= 0 {
            return Err(ConfigError::InvalidCookieMaxAge {
                value: self.auth_cookie_max_age_seconds,
            });
        }

        // Local and test profiles run against fakes or local stacks
        if matches!(self.profile.as_str(), "local" | "test") {
            return Ok(());
        }

        if self.cognito_client_id.is_none() {
            return Err(ConfigError::MissingSetting {
                key: "COGNITO_CLIENT_ID",
            });
        }
        if self.cognito_client_secret.is_none() {
            return Err(ConfigError::MissingSetting {
                key: "COGNITO_CLIENT_SECRET",
            });
        }
        if self.s3_bucket.is_none() {
            return Err(ConfigError::MissingSetting { key: "S3_BUCKET" });
        }
        if self.s3_access_key_id.is_none() {
            return Err(ConfigError::MissingSetting {
                key: "S3_ACCESS_KEY_ID",
            });
        }
        if self.s3_secret_access_key.is_none() {
            return Err(ConfigError::MissingSetting {
                key: "S3_SECRET_ACCESS_KEY",
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "postgresql://localhost:5432/eventosnow".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_db_connect_retries() -> u32 {
    5
}

fn default_db_connect_retry_delay_ms() -> u64 {
    100
}

fn default_aws_region() -> String {
    "us-east-2".to_string()
}

fn default_auth_cookie_name() -> String {
    "eventosnow-auth-token".to_string()
}

fn default_auth_cookie_max_age_seconds() -> i64 {
    60 * 60 * 72 // 72 hours
}

fn default_max_upload_body_bytes() -> usize {
    8 * 1024 * 1024 // room for a 3 MiB logo plus form fields
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{key} is missing; set {ENV_PREFIX}{key}")]
    MissingSetting { key: &'static str },
    #[error("database connect retries must be at least 1")]
    InvalidConnectRetries,
    #[error("auth cookie name cannot be empty")]
    InvalidCookieName,
    #[error("auth cookie max age must be positive, got {value}")]
    InvalidCookieMaxAge { value: i64 },
}

/// Loads configuration using layered `.env` files and `EVENTOSNOW_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env`, `.env.local`, `.env.{profile}`, `.env.{profile}.local`,
    /// then the process environment, later sources winning.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let mut take = |key: &str| {
            layered.remove(key).and_then(|val| {
                let trimmed = val.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let profile = take("PROFILE").unwrap_or(profile_hint);
        let api_bind_addr = take("API_BIND_ADDR").unwrap_or_else(default_api_bind_addr);
        let log_level = take("LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format = take("LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url = take("DATABASE_URL").unwrap_or_else(default_database_url);
        let db_max_connections = take("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = take("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let db_connect_retries = take("DB_CONNECT_RETRIES")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_connect_retries);
        let db_connect_retry_delay_ms = take("DB_CONNECT_RETRY_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_connect_retry_delay_ms);
        let aws_region = take("AWS_REGION").unwrap_or_else(default_aws_region);
        let cognito_client_id = take("COGNITO_CLIENT_ID");
        let cognito_client_secret = take("COGNITO_CLIENT_SECRET");
        let cognito_endpoint = take("COGNITO_ENDPOINT");
        let s3_bucket = take("S3_BUCKET");
        let s3_access_key_id = take("S3_ACCESS_KEY_ID");
        let s3_secret_access_key = take("S3_SECRET_ACCESS_KEY");
        let s3_endpoint = take("S3_ENDPOINT");
        let auth_cookie_name = take("AUTH_COOKIE_NAME").unwrap_or_else(default_auth_cookie_name);
        let auth_cookie_max_age_seconds = take("AUTH_COOKIE_MAX_AGE_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_auth_cookie_max_age_seconds);
        let max_upload_body_bytes = take("MAX_UPLOAD_BODY_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_upload_body_bytes);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            db_connect_retries,
            db_connect_retry_delay_ms,
            aws_region,
            cognito_client_id,
            cognito_client_secret,
            cognito_endpoint,
            s3_bucket,
            s3_access_key_id,
            s3_secret_access_key,
            s3_endpoint,
            auth_cookie_name,
            auth_cookie_max_age_seconds,
            max_upload_body_bytes,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
