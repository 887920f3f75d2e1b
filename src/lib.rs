//! # Eventosnow Backend Library
//!
//! Company accounts backed by an external identity provider, and the events
//! each company publishes, served over HTTP for the Eventosnow dashboard.

pub mod auth;
pub mod aws;
pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod events;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod repositories;
pub mod server;
pub mod storage;
pub mod telemetry;
pub mod validation;
pub use migration;
