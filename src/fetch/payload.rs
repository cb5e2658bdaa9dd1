//! Payload download

use super::get_checked;
use crate::error::{Error, Result};
use crate::types::RawPayload;
use tracing::info;
use url::Url;

/// Downloads the binary property list from a resolved location
#[derive(Clone, Debug)]
pub struct PayloadFetcher {
    client: reqwest::Client,
}

impl PayloadFetcher {
    /// Create a fetcher using the shared client
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download the payload at `url`
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] on transport failure or a non-2xx status
    /// - [`Error::EmptyPayload`] when the body has zero length
    pub async fn fetch_payload(&self, url: &Url) -> Result<RawPayload> {
        info!(%url, "downloading payload");

        let response = get_checked(&self.client, url, "payload").await?;
        let bytes = response.bytes().await.map_err(|e| {
            Error::Network(format!(
                "failed to read payload body from '{}': {}",
                url, e
            ))
        })?;

        if bytes.is_empty() {
            return Err(Error::EmptyPayload(format!(
                "downloaded payload from '{}' is empty",
                url
            )));
        }

        info!(%url, size = bytes.len(), "payload downloaded");
        Ok(RawPayload::new(bytes))
    }
}
