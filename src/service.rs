//! Conversion pipeline orchestration

use crate::config::Config;
use crate::convert::FormatConverter;
use crate::error::{Error, Result};
use crate::fetch::{MetadataFetcher, PayloadFetcher, build_client};
use crate::resolver::resolve_identifier;
use crate::types::{
    Capabilities, ConversionOutcome, ConversionRequest, ConvertedDocument, ResourceIdentifier,
    TargetFormat,
};
use tracing::{info, warn};

/// Runs link → identifier → record → payload → converted document
///
/// Stages run strictly in order and the first failure ends the call. The
/// service holds no per-request state, so one instance serves concurrent
/// requests.
#[derive(Clone, Debug)]
pub struct ConversionService {
    metadata: MetadataFetcher,
    payload: PayloadFetcher,
    converter: FormatConverter,
}

impl ConversionService {
    /// Assemble a service from its components
    pub fn new(metadata: MetadataFetcher, payload: PayloadFetcher, converter: FormatConverter) -> Self {
        Self {
            metadata,
            payload,
            converter,
        }
    }

    /// Build every component from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_client(&config.upstream)?;
        let metadata = MetadataFetcher::new(client.clone(), config.upstream.records_base_url.clone());
        let payload = PayloadFetcher::new(client);
        let converter = FormatConverter::from_config(config)?;
        Ok(Self::new(metadata, payload, converter))
    }

    /// Convert a validated request
    ///
    /// Never fails outright: every error is classified into
    /// [`ConversionOutcome::Failure`].
    pub async fn convert(&self, request: &ConversionRequest) -> ConversionOutcome {
        let outcome = ConversionOutcome::from(self.try_convert(request).await);
        if let ConversionOutcome::Failure { kind, message } = &outcome {
            warn!(link = %request.link, %kind, %message, "conversion failed");
        }
        outcome
    }

    /// Validate raw `link` and `fmt` values, then convert
    ///
    /// An unsupported format is rejected before any network call is made.
    pub async fn extract(&self, link: &str, format: &str) -> ConversionOutcome {
        match ConversionRequest::parse(link, format) {
            Ok(request) => self.convert(&request).await,
            Err(e) => ConversionOutcome::from(Err::<ConvertedDocument, _>(e)),
        }
    }

    /// Strategies available to the converter
    pub fn capabilities(&self) -> Capabilities {
        self.converter.capabilities()
    }

    #[tracing::instrument(skip(self, request), fields(link = %request.link, format = %request.format))]
    async fn try_convert(&self, request: &ConversionRequest) -> Result<ConvertedDocument> {
        let id = resolve_identifier(&request.link)?;
        let record = self.metadata.fetch_metadata(&id).await?;
        let location = record
            .download_location
            .ok_or_else(|| Error::NotFound(format!("record {} has no download URL", id)))?;

        let payload = self.payload.fetch_payload(&location).await?;
        let content = self.converter.convert(&payload, request.format).await?;

        let suggested_filename =
            suggested_filename(record.display_name.as_deref(), &id, request.format);
        info!(
            %id,
            filename = %suggested_filename,
            size = content.len(),
            "conversion complete"
        );

        Ok(ConvertedDocument {
            content,
            suggested_filename,
            format: request.format,
        })
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
pub fn sanitize_display_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{sanitized name}.{ext}`, or `shortcut_{id}.{ext}` without a name
pub fn suggested_filename(
    display_name: Option<&str>,
    id: &ResourceIdentifier,
    format: TargetFormat,
) -> String {
    let stem = match display_name {
        Some(name) => sanitize_display_name(name),
        None => sanitize_display_name(&format!("shortcut_{}", id)),
    };
    format!("{}.{}", stem, format.extension())
}
