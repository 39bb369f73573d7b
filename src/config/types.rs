// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub page: PageConfig,
    pub static_files: StaticConfig,
    pub relay: RelayConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (common, combined, or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "common".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Control page served at the site root
#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    pub file: String,
}

/// Directory tree served verbatim for unmatched GET paths
#[derive(Debug, Deserialize, Clone)]
pub struct StaticConfig {
    pub root: String,
}

/// External interpreter invocation for relayed commands
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Program to run (e.g. `python3`)
    pub interpreter: String,
    /// Script path passed as the first argument
    pub script: String,
    /// Kill the subprocess after this many seconds
    pub timeout_secs: u64,
}
