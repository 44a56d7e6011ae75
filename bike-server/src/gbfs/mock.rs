//! File-backed feed for development and testing without network access.
//!
//! Reads `station_status.json` and `station_information.json` from a
//! directory on every fetch, so editing the files changes what the next
//! reload sees.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::{StationInfo, StationStatus};

use super::convert::{parse_information, parse_status};
use super::error::{FeedError, FetchError};
use super::feed::StationFeed;

const STATUS_FILE: &str = "station_status.json";
const INFORMATION_FILE: &str = "station_information.json";

/// Feed that serves GBFS documents from a local directory.
#[derive(Debug, Clone)]
pub struct MockFeed {
    dir: PathBuf,
    active_only: bool,
}

impl MockFeed {
    /// Create a mock feed reading from `dir`.
    ///
    /// Fails if either feed file is missing.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let dir = dir.as_ref().to_path_buf();

        for file in [STATUS_FILE, INFORMATION_FILE] {
            let path = dir.join(file);
            if !path.is_file() {
                return Err(FetchError::Io {
                    location: path.display().to_string(),
                    error: std::io::Error::new(std::io::ErrorKind::NotFound, "feed file missing"),
                });
            }
        }

        Ok(Self {
            dir,
            active_only: true,
        })
    }

    /// Keep or drop stations that are not renting and returning.
    pub fn with_active_only(mut self, active_only: bool) -> Self {
        self.active_only = active_only;
        self
    }

    async fn read_json(&self, file: &str) -> Result<Value, FetchError> {
        let path = self.dir.join(file);
        let location = path.display().to_string();

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| FetchError::Io {
                location: location.clone(),
                error,
            })?;

        serde_json::from_str(&contents).map_err(|e| FetchError::Json {
            location,
            message: e.to_string(),
        })
    }
}

impl StationFeed for MockFeed {
    async fn fetch_status(&self) -> Result<Vec<StationStatus>, FeedError> {
        let document = self.read_json(STATUS_FILE).await?;
        Ok(parse_status(&document, self.active_only)?)
    }

    async fn fetch_information(&self) -> Result<Vec<StationInfo>, FeedError> {
        let document = self.read_json(INFORMATION_FILE).await?;
        Ok(parse_information(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbfs::ParseError;
    use tempfile::tempdir;

    fn write(dir: &Path, file: &str, contents: &str) {
        std::fs::write(dir.join(file), contents).unwrap();
    }

    #[tokio::test]
    async fn load_bundled_mock_data() {
        let feed = MockFeed::new("data/mock_feed").unwrap();

        let statuses = feed.fetch_status().await.unwrap();
        let infos = feed.fetch_information().await.unwrap();

        assert!(!statuses.is_empty());
        assert!(!infos.is_empty());
    }

    #[test]
    fn missing_files_rejected() {
        let dir = tempdir().unwrap();
        write(dir.path(), STATUS_FILE, r#"{"data":{"stations":[]}}"#);

        let err = MockFeed::new(dir.path()).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_fetch_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), STATUS_FILE, "not json");
        write(dir.path(), INFORMATION_FILE, r#"{"data":{"stations":[]}}"#);

        let feed = MockFeed::new(dir.path()).unwrap();

        let err = feed.fetch_status().await.unwrap_err();
        assert!(matches!(err, FeedError::Fetch(FetchError::Json { .. })));
        assert!(feed.fetch_information().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_is_parse_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), STATUS_FILE, r#"{"stations":[]}"#);
        write(dir.path(), INFORMATION_FILE, r#"{"data":{"stations":[]}}"#);

        let feed = MockFeed::new(dir.path()).unwrap();

        let err = feed.fetch_status().await.unwrap_err();
        assert!(matches!(err, FeedError::Parse(ParseError::MissingStations)));
    }

    #[tokio::test]
    async fn file_removed_after_creation_is_io_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), STATUS_FILE, r#"{"data":{"stations":[]}}"#);
        write(dir.path(), INFORMATION_FILE, r#"{"data":{"stations":[]}}"#);

        let feed = MockFeed::new(dir.path()).unwrap();
        std::fs::remove_file(dir.path().join(STATUS_FILE)).unwrap();

        let err = feed.fetch_status().await.unwrap_err();
        assert!(matches!(err, FeedError::Fetch(FetchError::Io { .. })));
    }

    #[tokio::test]
    async fn rereads_files_on_each_fetch() {
        let dir = tempdir().unwrap();
        write(dir.path(), STATUS_FILE, r#"{"data":{"stations":[]}}"#);
        write(dir.path(), INFORMATION_FILE, r#"{"data":{"stations":[]}}"#);

        let feed = MockFeed::new(dir.path()).unwrap();
        assert!(feed.fetch_information().await.unwrap().is_empty());

        write(
            dir.path(),
            INFORMATION_FILE,
            r#"{"data":{"stations":[{"station_id":"A","name":"Alpha","lat":35.0,"lon":139.0,"capacity":5}]}}"#,
        );
        assert_eq!(feed.fetch_information().await.unwrap().len(), 1);
    }
}
