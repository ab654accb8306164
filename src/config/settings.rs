//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Hosted backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_storage_bucket")]
    pub storage_bucket: String,
    #[serde(default = "default_settings_id")]
    pub settings_id: String,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

/// Administrator credentials used by the binary
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Dashboard behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    pub page_size: usize,
    pub food_vocabulary: Vec<String>,
    pub other_food_label: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_storage_bucket() -> String {
    "event-assets".to_string()
}

fn default_settings_id() -> String {
    "current_event".to_string()
}

fn default_poll_interval_seconds() -> u64 {
    5
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
            storage_bucket: default_storage_bucket(),
            settings_id: default_settings_id(),
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            food_vocabulary: [
                "Arroz",
                "Feijão",
                "Macarrão",
                "Açúcar",
                "Óleo",
                "Farinha",
                "Leite em pó",
                "Café",
                "Outros",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            other_food_label: "Outros".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "bloco-checkin.log".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `BLOCO__*` environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from a named config file (extension optional) plus the environment
    pub fn from_file(name: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .add_source(config::Environment::with_prefix("BLOCO").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::CheckinError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            admin: AdminConfig::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bloco.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[gateway]
url = "https://example.supabase.co"
anon_key = "anon"

[dashboard]
page_size = 25
food_vocabulary = ["Arroz", "Outros"]
other_food_label = "Outros"
"#
        )
        .unwrap();

        let settings = Settings::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(settings.gateway.url, "https://example.supabase.co");
        assert_eq!(settings.gateway.settings_id, "current_event");
        assert_eq!(settings.gateway.storage_bucket, "event-assets");
        assert_eq!(settings.dashboard.page_size, 25);
        assert_eq!(settings.logging.level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        std::env::set_var("BLOCO__GATEWAY__URL", "https://env.supabase.co");
        std::env::set_var("BLOCO__GATEWAY__ANON_KEY", "env-key");

        let settings = Settings::from_file("does-not-exist").unwrap();
        assert_eq!(settings.gateway.url, "https://env.supabase.co");
        assert_eq!(settings.gateway.anon_key, "env-key");
        assert_eq!(settings.dashboard.page_size, 10);

        std::env::remove_var("BLOCO__GATEWAY__URL");
        std::env::remove_var("BLOCO__GATEWAY__ANON_KEY");
    }
}
