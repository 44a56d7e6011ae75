//! GBFS HTTP client.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::domain::{StationInfo, StationStatus};

use super::convert::{parse_information, parse_status};
use super::error::{FeedError, FetchError};
use super::feed::StationFeed;

/// Docomo Cycle Tokyo station status, via the ODPT public API.
const DEFAULT_STATUS_URL: &str =
    "https://api-public.odpt.org/api/v4/gbfs/docomo-cycle-tokyo/station_status.json";

/// Docomo Cycle Tokyo station information, via the ODPT public API.
const DEFAULT_INFORMATION_URL: &str =
    "https://api-public.odpt.org/api/v4/gbfs/docomo-cycle-tokyo/station_information.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the GBFS client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// URL of `station_status.json`
    pub status_url: String,
    /// URL of `station_information.json`
    pub information_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Drop stations that are not both renting and returning
    pub active_only: bool,
}

impl FeedConfig {
    /// Create a config for the given pair of feed URLs.
    pub fn new(status_url: impl Into<String>, information_url: impl Into<String>) -> Self {
        Self {
            status_url: status_url.into(),
            information_url: information_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            active_only: true,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Keep or drop stations that are not renting and returning.
    pub fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_URL, DEFAULT_INFORMATION_URL)
    }
}

/// Client for a pair of GBFS station feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
}

impl FeedClient {
    /// Create a new GBFS client.
    pub fn new(config: FeedConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { http, config })
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Fails on network errors, timeouts, non-2xx statuses and bodies that
    /// are not JSON. No retries.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!(url, "fetching feed");

        let request_error = |error: reqwest::Error| {
            if error.is_timeout() {
                FetchError::Timeout {
                    location: url.to_string(),
                }
            } else {
                FetchError::Http {
                    location: url.to_string(),
                    error,
                }
            }
        };

        let response = self.http.get(url).send().await.map_err(request_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                location: url.to_string(),
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let body = response.text().await.map_err(request_error)?;

        serde_json::from_str(&body).map_err(|e| FetchError::Json {
            location: url.to_string(),
            message: e.to_string(),
        })
    }
}

impl StationFeed for FeedClient {
    async fn fetch_status(&self) -> Result<Vec<StationStatus>, FeedError> {
        let document = self.fetch_json(&self.config.status_url).await?;
        let statuses = parse_status(&document, self.config.active_only)?;
        info!(count = statuses.len(), "loaded station status");
        Ok(statuses)
    }

    async fn fetch_information(&self) -> Result<Vec<StationInfo>, FeedError> {
        let document = self.fetch_json(&self.config.information_url).await?;
        let infos = parse_information(&document)?;
        info!(count = infos.len(), "loaded station information");
        Ok(infos)
    }
}
