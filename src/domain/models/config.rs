use serde::{Deserialize, Serialize};

/// Main configuration structure for partnerflow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound email configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Commerce platform (coupon provisioning) configuration
    #[serde(default)]
    pub commerce: CommerceConfig,

    /// Influencer portal configuration
    #[serde(default)]
    pub portal: PortalConfig,

    /// Retry policy for HTTP adapters
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".partnerflow/partnerflow.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Outbound email configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmailConfig {
    /// Delivery backend: `log` or `http`
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// Base URL of the email API (http provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Bearer token for the email API (can also be set via `PARTNERFLOW_EMAIL__API_KEY`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sender address
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Client-side send rate
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Optional YAML file overriding built-in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_path: Option<String>,
}

fn default_email_provider() -> String {
    "log".to_string()
}

fn default_from_address() -> String {
    "partnerships@example.com".to_string()
}

const fn default_requests_per_second() -> u32 {
    2
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_email_provider(),
            base_url: None,
            api_key: None,
            from_address: default_from_address(),
            requests_per_second: default_requests_per_second(),
            templates_path: None,
        }
    }
}

/// Commerce platform configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommerceConfig {
    /// Store admin API base URL, e.g. `https://shop.example.com/admin/api/2024-01`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Admin API access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Price rule the influencer discount codes are attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_rule_id: Option<String>,
}

impl CommerceConfig {
    /// All three settings are present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.access_token.is_some() && self.price_rule_id.is_some()
    }
}

/// Influencer portal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PortalConfig {
    /// Public portal URL; the token is appended as `{base_url}/{token}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl PortalConfig {
    pub fn url_for(&self, token: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/{token}", base.trim_end_matches('/')))
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
