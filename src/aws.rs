//! Shared AWS SDK configuration for the identity and storage adapters.
//!
//! Provider calls are made once; a failure surfaces to the request that
//! caused it.

use aws_config::{BehaviorVersion, Region, SdkConfig, retry::RetryConfig};

use crate::config::AppConfig;

/// Loads the default provider chain pinned to the configured region.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}

#[cfg(test)]
pub(crate) fn static_sdk_config() -> SdkConfig {
    use aws_credential_types::{Credentials, provider::SharedCredentialsProvider};

    SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-2"))
        .retry_config(RetryConfig::disabled())
        .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            None,
            None,
            "static",
        )))
        .build()
}
