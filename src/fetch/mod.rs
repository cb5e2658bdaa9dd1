//! Remote resource resolution
//!
//! Two sequential fetches turn an identifier into a payload:
//!
//! - [`MetadataFetcher`] looks up the record and extracts the download location
//!   and display name
//! - [`PayloadFetcher`] downloads the binary property list from that location
//!
//! Both issue a single GET per call with no retries. Transport failures and
//! non-2xx statuses are reported as [`Error::Network`].

use crate::config::UpstreamConfig;
use crate::error::{Error, Result};
use url::Url;

mod metadata;
mod payload;

pub use metadata::{MetadataFetcher, parse_record};
pub use payload::PayloadFetcher;

/// Build the HTTP client shared by both fetchers
///
/// Idle connections are not pooled, so nothing outlives the request that
/// opened it.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|e| Error::Config {
            message: format!("failed to create HTTP client: {}", e),
            key: None,
        })
}

/// Issue a GET and reject transport failures and non-2xx responses
pub(crate) async fn get_checked(
    client: &reqwest::Client,
    url: &Url,
    what: &str,
) -> Result<reqwest::Response> {
    let response = client.get(url.clone()).send().await.map_err(|e| {
        let message = if e.is_timeout() {
            format!("timeout fetching {} from '{}'", what, url)
        } else if e.is_connect() {
            format!("connection failed fetching {} from '{}': {}", what, url, e)
        } else {
            format!("failed to fetch {} from '{}': {}", what, url, e)
        };
        Error::Network(message)
    })?;

    if !response.status().is_success() {
        return Err(Error::Network(format!(
            "HTTP error fetching {}: {} {}",
            what,
            response.status(),
            url
        )));
    }

    Ok(response)
}
