//! Configuration types for shortcut-extract
//!
//! The configuration is built once at process start (see the binary's CLI
//! parser) and shared read-only through an `Arc`. No component reads the
//! environment on its own.

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use url::Url;

/// Main configuration for the conversion service
///
/// Fields are organized into sub-configs:
/// - [`api`](ApiConfig) — listener address, CORS, Swagger UI
/// - [`upstream`](UpstreamConfig) — record-lookup endpoint and HTTP client settings
/// - [`tools`](ToolsConfig) — external converter discovery
/// - [`staging`](StagingConfig) — scratch directory for staging files
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Remote collaborator settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// External converter discovery
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Filesystem staging
    #[serde(default)]
    pub staging: StagingConfig,

    /// Log verbosity used when `RUST_LOG` is not set (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 0.0.0.0:3333)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Allowed CORS methods (default: GET, POST, OPTIONS)
    #[serde(default = "default_cors_methods")]
    pub cors_methods: Vec<String>,

    /// Allowed CORS request headers
    #[serde(default = "default_cors_headers")]
    pub cors_headers: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            cors_methods: default_cors_methods(),
            cors_headers: default_cors_headers(),
            swagger_ui: true,
        }
    }
}

/// Record-lookup endpoint and outbound HTTP settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the record-lookup endpoint; the identifier is appended as a path segment
    #[serde(default = "default_records_base_url")]
    pub records_base_url: Url,

    /// Timeout applied to each outbound request (default: 30 seconds)
    #[serde(with = "duration_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// User-Agent header sent upstream
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            records_base_url: default_records_base_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// External converter discovery
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Use an external converter at all (default: true)
    #[serde(default = "default_true")]
    pub external_tool_enabled: bool,

    /// Path to plutil (macOS; auto-detected if None)
    #[serde(default)]
    pub plutil_path: Option<PathBuf>,

    /// Path to plistutil (other platforms; auto-detected if None)
    #[serde(default)]
    pub plistutil_path: Option<PathBuf>,

    /// Whether to search PATH for the converter if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            external_tool_enabled: true,
            plutil_path: None,
            plistutil_path: None,
            search_path: true,
        }
    }
}

/// Filesystem staging configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory for per-request staging files (default: the OS temp dir)
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl StagingConfig {
    /// Effective scratch directory
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3333))
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_methods() -> Vec<String> {
    ["GET", "POST", "OPTIONS"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_cors_headers() -> Vec<String> {
    [
        "DNT",
        "User-Agent",
        "X-Requested-With",
        "If-Modified-Since",
        "Cache-Control",
        "Content-Type",
        "Range",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

/// Default record-lookup endpoint
pub const DEFAULT_RECORDS_BASE_URL: &str = "https://www.icloud.com/shortcuts/api/records";

#[allow(clippy::expect_used)]
fn default_records_base_url() -> Url {
    // Constant input; covered by config tests
    Url::parse(DEFAULT_RECORDS_BASE_URL).expect("default records URL is valid")
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    format!("shortcut-extract/{}", env!("CARGO_PKG_VERSION"))
}

fn default_log_level() -> String {
    "info".to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
