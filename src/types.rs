//! Core types for the conversion pipeline

use crate::error::{Error, ErrorKind, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;
use utoipa::ToSchema;

/// Textual rendering requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// XML property list
    Xml,
}

impl TargetFormat {
    /// File extension for the suggested filename
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Json => "json",
            TargetFormat::Xml => "xml",
        }
    }

    /// Content type of the HTTP response body
    pub fn content_type(&self) -> &'static str {
        match self {
            TargetFormat::Json => "application/json",
            TargetFormat::Xml => "application/xml",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(TargetFormat::Json),
            "xml" => Ok(TargetFormat::Xml),
            other => Err(Error::InvalidInput(format!(
                "format must be json or xml, got '{}'",
                other
            ))),
        }
    }
}

/// Identifier of a shared record, taken from the last path segment of a link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier(String);

impl ResourceIdentifier {
    /// Wrap a non-empty identifier
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidInput(
                "could not extract a shortcut identifier from the link".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Borrow the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the record-lookup endpoint tells us about a shared record
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataRecord {
    /// Where the binary payload can be downloaded
    pub download_location: Option<Url>,
    /// Human-readable record name
    pub display_name: Option<String>,
}

/// Binary property list as downloaded, owned by a single conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(Bytes);

impl RawPayload {
    /// Wrap downloaded bytes
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload size in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload is zero-length
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A validated conversion request
///
/// The target format is parsed before any network call is made, so an
/// unsupported `fmt` never reaches the remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Shareable link to the record
    pub link: String,
    /// Requested rendering
    pub format: TargetFormat,
}

impl ConversionRequest {
    /// Create a request from an already-typed format
    pub fn new(link: impl Into<String>, format: TargetFormat) -> Self {
        Self {
            link: link.into(),
            format,
        }
    }

    /// Validate raw query values into a request
    pub fn parse(link: &str, format: &str) -> Result<Self> {
        let format = format.parse()?;
        Ok(Self::new(link, format))
    }
}

/// The converted document handed back to the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Converted text
    pub content: String,
    /// `{sanitized name}.{extension}`
    pub suggested_filename: String,
    /// Rendering of `content`
    pub format: TargetFormat,
}

/// Result of one conversion call: the full document or a classified failure
#[derive(Debug)]
pub enum ConversionOutcome {
    /// Conversion completed
    Success(ConvertedDocument),
    /// Conversion stopped at the first failing stage
    Failure {
        /// Classification used for the HTTP status
        kind: ErrorKind,
        /// Human-readable description
        message: String,
    },
}

impl ConversionOutcome {
    /// Whether this is the success variant
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success(_))
    }

    /// Failure kind, if any
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ConversionOutcome::Success(_) => None,
            ConversionOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Result<ConvertedDocument>> for ConversionOutcome {
    fn from(result: Result<ConvertedDocument>) -> Self {
        match result {
            Ok(document) => ConversionOutcome::Success(document),
            Err(e) => ConversionOutcome::Failure {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }
}

/// Which conversion strategies this host can use
///
/// Returned by `GET /capabilities`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Host platform family used to select the external tool ("macos" or "other")
    pub host_platform: String,

    /// External converter in use, if one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_tool: Option<ExternalToolInfo>,

    /// The in-process decoder is always available
    pub in_process: bool,
}

/// Information about the external converter binary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExternalToolInfo {
    /// Tool name (plutil or plistutil)
    pub name: String,
    /// Resolved binary path
    #[schema(value_type = String)]
    pub path: PathBuf,
}
