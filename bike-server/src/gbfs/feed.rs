//! Station feed abstraction.

use std::future::Future;

use crate::domain::{StationInfo, StationStatus};

use super::client::FeedClient;
use super::error::FeedError;
use super::mock::MockFeed;

/// A source of station status and station information records.
pub trait StationFeed {
    /// Fetch and decode the status feed.
    fn fetch_status(&self) -> impl Future<Output = Result<Vec<StationStatus>, FeedError>> + Send;

    /// Fetch and decode the information feed.
    fn fetch_information(
        &self,
    ) -> impl Future<Output = Result<Vec<StationInfo>, FeedError>> + Send;
}

/// The feed the server is configured with: live HTTP or files on disk.
#[derive(Debug, Clone)]
pub enum FeedSource {
    Live(FeedClient),
    Mock(MockFeed),
}

impl StationFeed for FeedSource {
    async fn fetch_status(&self) -> Result<Vec<StationStatus>, FeedError> {
        match self {
            FeedSource::Live(client) => client.fetch_status().await,
            FeedSource::Mock(mock) => mock.fetch_status().await,
        }
    }

    async fn fetch_information(&self) -> Result<Vec<StationInfo>, FeedError> {
        match self {
            FeedSource::Live(client) => client.fetch_information().await,
            FeedSource::Mock(mock) => mock.fetch_information().await,
        }
    }
}
