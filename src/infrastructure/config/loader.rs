use std::path::Path;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".partnerflow";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid email provider: {0}. Must be one of: log, http")]
    InvalidEmailProvider(String),

    #[error("Email provider 'http' requires {0}")]
    MissingEmailSetting(&'static str),

    #[error("Invalid requests_per_second: {0}. Must be at least 1")]
    InvalidRateLimit(u32),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .partnerflow/config.yaml (project config, created by init)
    /// 3. .partnerflow/local.yaml (project local overrides, optional)
    /// 4. Environment variables (PARTNERFLOW_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same layering as [`ConfigLoader::load`], rooted at `dir`.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("PARTNERFLOW_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Database
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        // Logging
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        // Email
        match config.email.provider.as_str() {
            "log" => {}
            "http" => {
                if config.email.base_url.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::MissingEmailSetting("email.base_url"));
                }
                if config.email.api_key.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::MissingEmailSetting("email.api_key"));
                }
            }
            other => return Err(ConfigError::InvalidEmailProvider(other.to_string())),
        }

        if config.email.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                config.email.requests_per_second,
            ));
        }

        // Commerce settings come as a set
        let commerce = &config.commerce;
        let any_commerce = commerce.base_url.is_some()
            || commerce.access_token.is_some()
            || commerce.price_rule_id.is_some();
        if any_commerce && !commerce.is_configured() {
            return Err(ConfigError::ValidationFailed(
                "commerce requires base_url, access_token and price_rule_id together".to_string(),
            ));
        }

        // Retry
        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".partnerflow/partnerflow.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.email.provider, "log");
        assert!(!config.commerce.is_configured());
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 3
logging:
  level: debug
  format: json
email:
  provider: http
  base_url: https://mail.example.com
  api_key: secret
  requests_per_second: 5
portal:
  base_url: https://partners.example.com/portal/
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.email.requests_per_second, 5);
        assert_eq!(
            config.portal.url_for("abc").as_deref(),
            Some("https://partners.example.com/portal/abc")
        );
        assert_eq!(config.retry.max_retries, 3, "Missing sections use defaults");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(format) if format == "xml"
        ));
    }

    #[test]
    fn test_validate_database() {
        let mut config = Config::default();
        config.database.path = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyDatabasePath
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidMaxConnections(0)
        ));
    }

    #[test]
    fn test_validate_email_provider() {
        let mut config = Config::default();
        config.email.provider = "smtp".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidEmailProvider(p) if p == "smtp"
        ));

        config.email.provider = "http".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::MissingEmailSetting("email.base_url")
        ));

        config.email.base_url = Some("https://mail.example.com".to_string());
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::MissingEmailSetting("email.api_key")
        ));

        config.email.api_key = Some("key".to_string());
        assert!(ConfigLoader::validate(&config).is_ok());

        config.email.requests_per_second = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidRateLimit(0)
        ));
    }

    #[test]
    fn test_validate_partial_commerce() {
        let mut config = Config::default();
        config.commerce.base_url = Some("https://shop.example.com/admin/api/2024-01".to_string());

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ValidationFailed(_)
        ));

        config.commerce.access_token = Some("shpat_x".to_string());
        config.commerce.price_rule_id = Some("42".to_string());
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_retry() {
        let mut config = Config::default();
        config.retry.max_retries = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidMaxRetries(0)
        ));

        let mut config = Config::default();
        config.retry.initial_backoff_ms = 30000;
        config.retry.max_backoff_ms = 10000;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidBackoff(30000, 10000)
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.yaml"),
            "logging:\n  level: info\n  format: json\ndatabase:\n  path: base.db\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("local.yaml"), "logging:\n  level: debug\n").unwrap();

        let config = temp_env::with_vars_unset(
            ["PARTNERFLOW_LOGGING__LEVEL", "PARTNERFLOW_DATABASE__PATH"],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.logging.level, "debug", "Local overrides project config");
        assert_eq!(config.logging.format, "json", "Base value persists when not overridden");
        assert_eq!(config.database.path, "base.db");
    }

    #[test]
    fn test_env_override() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "logging:\n  level: info\n").unwrap();

        let config = temp_env::with_vars(
            [
                ("PARTNERFLOW_LOGGING__LEVEL", Some("warn")),
                ("PARTNERFLOW_EMAIL__REQUESTS_PER_SECOND", Some("7")),
                ("PARTNERFLOW_PORTAL__BASE_URL", Some("https://p.example.com")),
            ],
            || ConfigLoader::load_from_dir(dir.path()).unwrap(),
        );

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.email.requests_per_second, 7);
        assert_eq!(config.portal.base_url.as_deref(), Some("https://p.example.com"));
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  format: xml").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("xml"));
    }
}
