use clap::Parser;
use clap::builder::BoolishValueParser;
use shortcut_extract::config::{ApiConfig, StagingConfig, ToolsConfig, UpstreamConfig};
use shortcut_extract::{Config, ConversionService, api};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

/// HTTP service that converts shared shortcuts to JSON or XML
#[derive(Parser, Debug)]
#[command(name = "shortcut-extract", version, about)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 3333)]
    port: u16,

    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Send CORS headers
    #[arg(
        long,
        env = "ENABLE_CORS",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    enable_cors: bool,

    /// Comma-separated allowed origins ("*" for any)
    #[arg(long, env = "ALLOWED_ORIGINS", default_value = "*", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Comma-separated allowed methods
    #[arg(
        long,
        env = "ALLOWED_METHODS",
        default_value = "GET,POST,OPTIONS",
        value_delimiter = ','
    )]
    allowed_methods: Vec<String>,

    /// Comma-separated allowed request headers
    #[arg(
        long,
        env = "ALLOWED_HEADERS",
        default_value = "DNT,User-Agent,X-Requested-With,If-Modified-Since,Cache-Control,Content-Type,Range",
        value_delimiter = ','
    )]
    allowed_headers: Vec<String>,

    /// Disable the Swagger UI at /swagger-ui
    #[arg(long, env = "DISABLE_SWAGGER_UI")]
    no_swagger_ui: bool,

    /// Record-lookup endpoint; the identifier is appended as a path segment
    #[arg(long, env = "RECORDS_BASE_URL", default_value = shortcut_extract::config::DEFAULT_RECORDS_BASE_URL)]
    records_base_url: Url,

    /// Timeout for each upstream request, in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Never use an external converter, only the in-process decoder
    #[arg(long, env = "DISABLE_EXTERNAL_TOOL")]
    no_external_tool: bool,

    /// Explicit path to plutil (macOS)
    #[arg(long, env = "PLUTIL_PATH")]
    plutil_path: Option<PathBuf>,

    /// Explicit path to plistutil (other platforms)
    #[arg(long, env = "PLISTUTIL_PATH")]
    plistutil_path: Option<PathBuf>,

    /// Directory for per-request staging files (default: OS temp dir)
    #[arg(long, env = "SCRATCH_DIR")]
    scratch_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            api: ApiConfig {
                bind_address: SocketAddr::new(self.host, self.port),
                cors_enabled: self.enable_cors,
                cors_origins: trimmed(self.allowed_origins),
                cors_methods: trimmed(self.allowed_methods),
                cors_headers: trimmed(self.allowed_headers),
                swagger_ui: !self.no_swagger_ui,
            },
            upstream: UpstreamConfig {
                records_base_url: self.records_base_url,
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..UpstreamConfig::default()
            },
            tools: ToolsConfig {
                external_tool_enabled: !self.no_external_tool,
                plutil_path: self.plutil_path,
                plistutil_path: self.plistutil_path,
                ..ToolsConfig::default()
            },
            staging: StagingConfig {
                scratch_dir: self.scratch_dir,
            },
            log_level: self.log_level,
        }
    }
}

fn trimmed(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn init_logging(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    init_logging(&config.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "shortcut-extract starting");

    let service = match ConversionService::from_config(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize conversion service");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = api::start_api_server(service, Arc::new(config)).await {
        tracing::error!(error = %e, "API server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "shortcut-extract",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
            "--enable-cors",
            "off",
            "--allowed-origins",
            "http://a.example, http://b.example",
            "--no-external-tool",
            "--log-level",
            "DEBUG",
        ])
        .unwrap();
        let config = cli.into_config();

        assert_eq!(config.api.bind_address, "127.0.0.1:8080".parse().unwrap());
        assert!(!config.api.cors_enabled);
        assert_eq!(
            config.api.cors_origins,
            vec!["http://a.example", "http://b.example"]
        );
        assert!(!config.tools.external_tool_enabled);
        assert_eq!(config.log_level, "DEBUG");
    }
}
