//! BlocoCheckin
//!
//! Client library for the event registration and check-in dashboard.
//! Everything persistent lives in a hosted backend; this crate validates
//! forms, drives the bracelet-delivery lifecycle, derives dashboard
//! statistics and keeps an in-memory snapshot in sync with the backend's
//! change notifications.

#![allow(non_snake_case)]

pub mod config;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
pub mod stats;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{CheckinError, GatewayError, Result};

// Re-export main components for easy access
pub use gateway::{Gateway, MemoryGateway, RestGateway};
pub use services::ServiceFactory;
pub use state::{DashboardSession, DashboardState, Snapshot};
pub use stats::DashboardStats;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
