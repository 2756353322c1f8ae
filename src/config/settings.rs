use serde::Deserialize;

use crate::config::regions::RegionPolicy;

pub const REFRESH_THRESHOLD_SECONDS_DEFAULT: u64 = 6 * 60 * 60;
pub const MAX_RETENTION_SECONDS_DEFAULT: u64 = 7 * 60 * 60;
pub const ISSUER_TIMEOUT_MS_DEFAULT: u64 = 5_000;
pub const DISPATCH_TIMEOUT_MS_DEFAULT: u64 = 10_000;

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub issuer: IssuerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    pub payload: PayloadConfig,
    /// directory with `<region>_config.json` credential files
    #[serde(default = "default_credentials_dir")]
    pub credentials_dir: String,
    pub region_policy: RegionPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: false,
        }
    }
}

/// Token cache timing.
/// invariant: refresh_threshold_seconds < max_retention_seconds
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_refresh_threshold")]
    pub refresh_threshold_seconds: u64,
    /// hard ceiling, entries older than this are evicted on access
    #[serde(default = "default_max_retention")]
    pub max_retention_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_threshold_seconds: default_refresh_threshold(),
            max_retention_seconds: default_max_retention(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IssuerConfig {
    pub url: String,
    #[serde(default = "default_issuer_timeout")]
    pub timeout_ms: u64,
    /// regions the issuer cannot serve, never called for
    #[serde(default = "default_unsupported_regions")]
    pub unsupported_regions: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DispatchConfig {
    #[serde(default = "default_dispatch_timeout")]
    pub timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_dispatch_timeout(),
        }
    }
}

/// AES-128-CBC key material: raw 16 byte string or `hex:` prefixed
#[derive(Debug, Deserialize, Clone)]
pub struct PayloadConfig {
    pub key: String,
    pub iv: String,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_credentials_dir() -> String {
    "config".to_string()
}

fn default_refresh_threshold() -> u64 {
    REFRESH_THRESHOLD_SECONDS_DEFAULT
}

fn default_max_retention() -> u64 {
    MAX_RETENTION_SECONDS_DEFAULT
}

fn default_issuer_timeout() -> u64 {
    ISSUER_TIMEOUT_MS_DEFAULT
}

fn default_dispatch_timeout() -> u64 {
    DISPATCH_TIMEOUT_MS_DEFAULT
}

fn default_unsupported_regions() -> Vec<String> {
    vec!["IND".to_string()]
}
