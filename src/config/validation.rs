//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{CheckinError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_gateway_config(&settings.gateway)?;
    validate_dashboard_config(&settings.dashboard)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate hosted backend configuration
fn validate_gateway_config(config: &super::GatewayConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(CheckinError::Config(
            "Gateway URL is required".to_string()
        ));
    }

    let parsed = url::Url::parse(&config.url)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CheckinError::Config(
            format!("Gateway URL must be http or https, got {}", parsed.scheme())
        ));
    }

    if config.anon_key.is_empty() {
        return Err(CheckinError::Config(
            "Gateway anon key is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(CheckinError::Config(
            "Gateway timeout must be greater than 0".to_string()
        ));
    }

    if config.poll_interval_seconds == 0 {
        return Err(CheckinError::Config(
            "Change poll interval must be greater than 0".to_string()
        ));
    }

    if config.settings_id.is_empty() {
        return Err(CheckinError::Config(
            "Settings row id is required".to_string()
        ));
    }

    Ok(())
}

/// Validate dashboard configuration
fn validate_dashboard_config(config: &super::DashboardConfig) -> Result<()> {
    if config.page_size == 0 {
        return Err(CheckinError::Config(
            "Page size must be greater than 0".to_string()
        ));
    }

    if config.food_vocabulary.is_empty() {
        return Err(CheckinError::Config(
            "At least one food category is required".to_string()
        ));
    }

    if !config.food_vocabulary.contains(&config.other_food_label) {
        return Err(CheckinError::Config(
            "Catch-all food label must be in the food vocabulary".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(CheckinError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(CheckinError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
