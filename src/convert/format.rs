//! Layered conversion: external tool, output correction, in-process fallback

use super::decoder::InProcessConverter;
use super::staging::StagingArea;
use super::tool::{ExternalToolConverter, HostPlatform};
use super::traits::Converter;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{Capabilities, ExternalToolInfo, RawPayload, TargetFormat};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Converts binary property lists into the requested rendering
///
/// 1. The external tool runs first, if one is configured.
/// 2. When the tool may have ignored a JSON request, its output is sniffed;
///    a property-list rendering is replaced by an in-process re-decode of the
///    original payload.
/// 3. When the tool fails, the in-process decoder converts instead.
///
/// Staged input and output files are removed on every exit path.
#[derive(Clone)]
pub struct FormatConverter {
    primary: Option<Arc<dyn Converter>>,
    fallback: InProcessConverter,
    staging: StagingArea,
    host: HostPlatform,
}

impl std::fmt::Debug for FormatConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatConverter")
            .field("primary", &self.primary.as_ref().map(|c| c.name()))
            .field("staging", &self.staging)
            .field("host", &self.host)
            .finish()
    }
}

impl FormatConverter {
    /// Create a converter with an explicit primary strategy
    pub fn new(
        primary: Option<Arc<dyn Converter>>,
        staging: StagingArea,
        host: HostPlatform,
    ) -> Self {
        Self {
            primary,
            fallback: InProcessConverter,
            staging,
            host,
        }
    }

    /// Build the converter for this host from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let host = HostPlatform::detect();
        let staging = StagingArea::new(config.staging.scratch_dir())?;

        let primary = ExternalToolConverter::discover(&config.tools, host)
            .map(|tool| Arc::new(tool) as Arc<dyn Converter>);

        match &primary {
            Some(tool) => info!(
                host = host.as_str(),
                converter = tool.name(),
                binary = ?tool.binary_path(),
                scratch_dir = %staging.dir().display(),
                "Format converter initialized"
            ),
            None => info!(
                host = host.as_str(),
                converter = InProcessConverter.name(),
                scratch_dir = %staging.dir().display(),
                "No external converter found, using in-process decoder only"
            ),
        }

        Ok(Self::new(primary, staging, host))
    }

    /// Strategies available on this host
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            host_platform: self.host.as_str().to_string(),
            external_tool: self.primary.as_ref().and_then(|tool| {
                tool.binary_path().map(|path| ExternalToolInfo {
                    name: tool.name().to_string(),
                    path: path.to_path_buf(),
                })
            }),
            in_process: true,
        }
    }

    /// Convert `payload` into `format`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conversion`] when every strategy failed or the
    /// result was empty. Staging failures surface as [`Error::Io`].
    pub async fn convert(&self, payload: &RawPayload, format: TargetFormat) -> Result<String> {
        let input = self.staging.stage_payload(payload.as_bytes()).await?;
        let output = self.staging.reserve_output(format)?;

        let Some(tool) = &self.primary else {
            return self.run_fallback(input.path(), output.path(), format).await;
        };

        match tool.convert(input.path(), output.path(), format).await {
            Ok(()) => {
                let bytes = read_output(output.path(), tool.name()).await?;
                if tool.needs_output_check(format) && looks_like_property_list(&bytes) {
                    info!(
                        converter = tool.name(),
                        "tool emitted a property list instead of {}, re-decoding in process", format
                    );
                    return self.run_fallback(input.path(), output.path(), format).await;
                }
                into_text(bytes)
            }
            Err(tool_error) => {
                warn!(
                    converter = tool.name(),
                    error = %tool_error,
                    "external converter failed, falling back to in-process decoder"
                );
                self.run_fallback(input.path(), output.path(), format)
                    .await
                    .map_err(|fallback_error| {
                        Error::Conversion(format!(
                            "{} failed ({}); in-process decoder failed ({})",
                            tool.name(),
                            tool_error,
                            fallback_error
                        ))
                    })
            }
        }
    }

    async fn run_fallback(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<String> {
        self.fallback.convert(input, output, format).await?;
        into_text(read_output(output, self.fallback.name()).await?)
    }
}

/// Whether `bytes` is a binary or XML property list rather than JSON
pub fn looks_like_property_list(bytes: &[u8]) -> bool {
    if bytes.starts_with(b"bplist") {
        return true;
    }
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<?xml") || head.contains("<plist")
}

async fn read_output(path: &Path, produced_by: &str) -> Result<Vec<u8>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::Conversion(format!(
                "{} produced no output file",
                produced_by
            )));
        }
        Err(e) => return Err(e.into()),
    };
    if bytes.is_empty() {
        return Err(Error::Conversion(format!(
            "{} produced an empty result",
            produced_by
        )));
    }
    debug!(path = %path.display(), size = bytes.len(), "conversion output read");
    Ok(bytes)
}

fn into_text(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| Error::Conversion(format!("converted output is not valid UTF-8: {}", e)))
}
