//! Record lookup

use super::get_checked;
use crate::error::{Error, Result};
use crate::types::{MetadataRecord, ResourceIdentifier};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

/// JSON pointer to the payload download URL inside a record
const DOWNLOAD_URL_POINTER: &str = "/fields/shortcut/value/downloadURL";

/// JSON pointer to the display name inside a record
const DISPLAY_NAME_POINTER: &str = "/fields/name/value";

/// Fetches metadata records from the record-lookup endpoint
#[derive(Clone, Debug)]
pub struct MetadataFetcher {
    client: reqwest::Client,
    records_base_url: Url,
}

impl MetadataFetcher {
    /// Create a fetcher for the given record-lookup base URL
    pub fn new(client: reqwest::Client, records_base_url: Url) -> Self {
        Self {
            client,
            records_base_url,
        }
    }

    /// Record-lookup URL for an identifier
    ///
    /// The identifier is appended as one percent-encoded path segment.
    pub fn record_url(&self, id: &ResourceIdentifier) -> Result<Url> {
        let mut url = self.records_base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| Error::Config {
                message: format!(
                    "records base URL '{}' cannot carry path segments",
                    self.records_base_url
                ),
                key: Some("records_base_url".to_string()),
            })?;
            segments.pop_if_empty().push(id.as_str());
        }
        Ok(url)
    }

    /// Look up the record for `id`
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] on transport failure or a non-2xx status
    /// - [`Error::Parse`] when the body is not JSON
    /// - [`Error::NotFound`] when the record has no download URL
    pub async fn fetch_metadata(&self, id: &ResourceIdentifier) -> Result<MetadataRecord> {
        let url = self.record_url(id)?;
        info!(%id, %url, "fetching record metadata");

        let response = get_checked(&self.client, &url, "record metadata").await?;
        let body = response.text().await.map_err(|e| {
            Error::Network(format!(
                "failed to read record response body from '{}': {}",
                url, e
            ))
        })?;

        let record = parse_record(&body)?;
        if record.download_location.is_none() {
            return Err(Error::NotFound(format!(
                "record {} has no download URL",
                id
            )));
        }

        debug!(
            %id,
            download_url = ?record.download_location.as_ref().map(Url::as_str),
            display_name = ?record.display_name,
            "record metadata resolved"
        );
        Ok(record)
    }
}

/// Extract a [`MetadataRecord`] from a record-lookup response body
///
/// Missing fields are not errors here; an empty display name counts as absent.
///
/// # Errors
///
/// [`Error::Parse`] when the body is not JSON or the download URL is not an
/// absolute URL.
pub fn parse_record(body: &str) -> Result<MetadataRecord> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("record response is not valid JSON: {}", e)))?;

    let download_location = value
        .pointer(DOWNLOAD_URL_POINTER)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Url::parse(s)
                .map_err(|e| Error::Parse(format!("invalid download URL '{}': {}", s, e)))
        })
        .transpose()?;

    let display_name = value
        .pointer(DISPLAY_NAME_POINTER)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(MetadataRecord {
        download_location,
        display_name,
    })
}
