//! # shortcut-extract
//!
//! HTTP service that turns a shared shortcut link into a readable document.
//!
//! A request walks a fixed pipeline:
//!
//! 1. take the record identifier from the link's last path segment
//! 2. look the record up and find where its payload lives
//! 3. download the binary property list
//! 4. convert it to pretty JSON or an XML property list, using `plutil` /
//!    `plistutil` when installed and the `plist` crate otherwise
//!
//! ## Quick Start
//!
//! ```no_run
//! use shortcut_extract::{Config, ConversionOutcome, ConversionService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = ConversionService::from_config(&Config::default())?;
//!
//!     match service
//!         .extract("https://www.icloud.com/shortcuts/abc123", "json")
//!         .await
//!     {
//!         ConversionOutcome::Success(doc) => println!("{}", doc.suggested_filename),
//!         ConversionOutcome::Failure { kind, message } => eprintln!("{kind}: {message}"),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Property list conversion strategies
pub mod convert;
/// Error types
pub mod error;
/// Record lookup and payload download
pub mod fetch;
/// Link to identifier extraction
pub mod resolver;
/// Conversion pipeline orchestration
pub mod service;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use convert::{Converter, FormatConverter};
pub use error::{ApiError, Error, ErrorKind, Result, ToHttpStatus};
pub use service::ConversionService;
pub use types::{
    Capabilities, ConversionOutcome, ConversionRequest, ConvertedDocument, MetadataRecord,
    RawPayload, ResourceIdentifier, TargetFormat,
};

/// Resolve once the process is asked to stop.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Used as the graceful-shutdown trigger of [`api::start_api_server`].
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Resolve once the process is asked to stop (Ctrl+C).
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
