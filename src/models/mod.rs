//! # Data Models
//!
//! SeaORM entities for the five persisted records (credential, company,
//! address, event, event configuration) plus a few response types shared by
//! handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod address;
pub mod company;
pub mod credential;
pub mod event;
pub mod event_config;

pub use address::Entity as Address;
pub use company::Entity as Company;
pub use credential::Entity as Credential;
pub use event::Entity as Event;
pub use event_config::Entity as EventConfig;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "eventosnow".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
