//! Error types for shortcut-extract
//!
//! This module provides error handling for the conversion pipeline, including:
//! - The crate-wide [`Error`] type returned by every component
//! - The [`ErrorKind`] taxonomy used to classify failures at the HTTP boundary
//! - HTTP status code mapping via [`ToHttpStatus`]
//! - The JSON error body returned to clients ([`ApiError`])

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for shortcut-extract operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for shortcut-extract
///
/// Every component returns this type. Each variant carries a human-readable
/// message that ends up in the `{"error": ...}` response body.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad format parameter, missing query parameter, or a link with no identifier
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A remote fetch failed at the transport level or returned a non-2xx status
    #[error("network error: {0}")]
    Network(String),

    /// The metadata record was not valid JSON (or held an unusable value)
    #[error("parse error: {0}")]
    Parse(String),

    /// The metadata record has no download location
    #[error("not found: {0}")]
    NotFound(String),

    /// The downloaded payload has zero length
    #[error("empty payload: {0}")]
    EmptyPayload(String),

    /// Every conversion strategy failed, or the result was empty
    #[error("conversion error: {0}")]
    Conversion(String),

    /// External converter execution failed (plutil, plistutil)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "records_base_url")
        key: Option<String>,
    },

    /// I/O error (staging area, listener bind)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Classification of a failed conversion
///
/// This is the taxonomy the HTTP boundary maps to status codes. Several
/// [`Error`] variants collapse into one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad format parameter or unparseable link
    InvalidInput,
    /// Remote fetch failed or returned non-2xx
    NetworkError,
    /// Metadata response is not valid structured text
    ParseError,
    /// Metadata present but missing a download location
    NotFound,
    /// Downloaded payload has zero length
    EmptyPayload,
    /// Both conversion strategies failed or produced nothing
    ConversionError,
    /// Anything unanticipated
    InternalError,
}

impl ErrorKind {
    /// Machine-readable name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::ParseError => "parse_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::EmptyPayload => "empty_payload",
            ErrorKind::ConversionError => "conversion_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error for the HTTP boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::InvalidInput,
            Error::Network(_) => ErrorKind::NetworkError,
            Error::Parse(_) => ErrorKind::ParseError,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::EmptyPayload(_) => ErrorKind::EmptyPayload,
            Error::Conversion(_) | Error::ExternalTool(_) => ErrorKind::ConversionError,
            Error::Config { .. } | Error::Io(_) | Error::ApiServerError(_) | Error::Other(_) => {
                ErrorKind::InternalError
            }
        }
    }
}

/// API error response format
///
/// Every failed request returns this body.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "not found: record abc123 has no download URL"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,
}

impl ApiError {
    /// Create a new API error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;
}

impl ToHttpStatus for ErrorKind {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - client input or upstream data problem
            ErrorKind::InvalidInput
            | ErrorKind::NetworkError
            | ErrorKind::ParseError
            | ErrorKind::NotFound
            | ErrorKind::EmptyPayload
            | ErrorKind::ConversionError => 400,

            // 500 Internal Server Error
            ErrorKind::InternalError => 500,
        }
    }
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
