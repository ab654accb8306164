//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the check-in dashboard.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{CheckinError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped, so the caller
/// keeps it alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| CheckinError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log admin actions
pub fn log_admin_action(action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a confirmed bracelet delivery
pub fn log_delivery(participant_id: &str, food_type: &str, food_kg: f64) {
    info!(
        participant_id = participant_id,
        food_type = food_type,
        food_kg = food_kg,
        "Bracelet delivered"
    );
}

/// Log gateway errors with context
pub fn log_gateway_error(operation: &str, table: &str, error: &CheckinError) {
    error!(
        operation = operation,
        table = table,
        error = %error,
        severity = %error.severity(),
        "Gateway operation failed"
    );
}

/// Log gateway calls
pub fn log_gateway_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Gateway operation completed"
        );
    } else {
        warn!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Gateway operation failed"
        );
    }
}

/// Log a change notification received for a table
pub fn log_table_change(table: &str) {
    debug!(table = table, "Change notification received");
}
