//! GBFS feed error types.

use crate::domain::InvalidStationId;

/// The feed document could not be retrieved as JSON.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("request to {location} timed out")]
    Timeout { location: String },

    /// Network-level failure (DNS, connection, TLS, body read)
    #[error("HTTP error fetching {location}: {error}")]
    Http {
        location: String,
        #[source]
        error: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("{location} returned status {status}: {message}")]
    Status {
        location: String,
        status: u16,
        message: String,
    },

    /// Local feed file could not be read
    #[error("failed to read {location}: {error}")]
    Io {
        location: String,
        #[source]
        error: std::io::Error,
    },

    /// Body was not valid JSON
    #[error("malformed JSON from {location}: {message}")]
    Json { location: String, message: String },
}

/// The JSON document did not have the expected GBFS shape.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No `data.stations` array
    #[error("document has no data.stations array")]
    MissingStations,

    /// A station entry could not be decoded
    #[error("station entry {index}: {message}")]
    Entry { index: usize, message: String },

    /// A station entry carried an unusable id
    #[error("station entry {index}: {error}")]
    StationId {
        index: usize,
        #[source]
        error: InvalidStationId,
    },

    /// `last_reported` was out of range or unparseable
    #[error("station {station_id}: invalid last_reported {value}")]
    Timestamp { station_id: String, value: String },
}

/// Any failure producing station records from a feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Status {
            location: "http://feed/station_status.json".into(),
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "http://feed/station_status.json returned status 503: Service Unavailable"
        );

        let err = FetchError::Timeout {
            location: "http://feed".into(),
        };
        assert_eq!(err.to_string(), "request to http://feed timed out");

        let err = ParseError::MissingStations;
        assert_eq!(err.to_string(), "document has no data.stations array");

        let err = ParseError::Entry {
            index: 3,
            message: "missing field `lat`".into(),
        };
        assert_eq!(err.to_string(), "station entry 3: missing field `lat`");
    }

    #[test]
    fn feed_error_is_transparent() {
        let err: FeedError = ParseError::MissingStations.into();
        assert_eq!(err.to_string(), "document has no data.stations array");
        assert!(matches!(err, FeedError::Parse(_)));

        let err: FeedError = FetchError::Json {
            location: "x".into(),
            message: "eof".into(),
        }
        .into();
        assert!(matches!(err, FeedError::Fetch(FetchError::Json { .. })));
    }
}
