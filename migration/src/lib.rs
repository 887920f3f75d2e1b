//! Database migrations for the eventosnow backend.
//!
//! Tables are created leaves first so foreign keys always point at an
//! existing table.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_000001_create_addresses;
mod m2025_01_10_000002_create_credentials;
mod m2025_01_10_000003_create_companies;
mod m2025_01_10_000004_create_events;
mod m2025_01_10_000005_create_event_configs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_000001_create_addresses::Migration),
            Box::new(m2025_01_10_000002_create_credentials::Migration),
            Box::new(m2025_01_10_000003_create_companies::Migration),
            Box::new(m2025_01_10_000004_create_events::Migration),
            Box::new(m2025_01_10_000005_create_event_configs::Migration),
        ]
    }
}
