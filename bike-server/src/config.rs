//! Server configuration.
//!
//! Everything the binary needs to start, read from `BIKE_*` environment
//! variables. Unset variables fall back to the defaults below.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::gbfs::FeedConfig;

const DEFAULT_STATIC_DIR: &str = "bike-server/static";

/// Errors from reading the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: invalid value {value:?}: {message}")]
    Invalid {
        var: &'static str,
        value: String,
        message: String,
    },
}

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Live feed settings (ignored when `mock_dir` is set)
    pub feed: FeedConfig,
    /// Read feeds from this directory instead of over HTTP
    pub mock_dir: Option<PathBuf>,
    /// Seed for the availability generator; entropy if unset
    pub seed: Option<u64>,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    pub fn with_feed(mut self, feed: FeedConfig) -> Self {
        self.feed = feed;
        self
    }

    pub fn with_mock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mock_dir = Some(dir.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIKE_BIND_ADDR") {
            config.bind_addr = parse_var("BIKE_BIND_ADDR", addr)?;
        }
        if let Some(dir) = lookup("BIKE_STATIC_DIR") {
            config.static_dir = dir.into();
        }
        if let Some(dir) = lookup("BIKE_MOCK_DIR") {
            config = config.with_mock_dir(dir);
        }
        if let Some(seed) = lookup("BIKE_SEED") {
            config = config.with_seed(parse_var("BIKE_SEED", seed)?);
        }

        if let Some(url) = lookup("BIKE_STATUS_URL") {
            config.feed.status_url = url;
        }
        if let Some(url) = lookup("BIKE_INFO_URL") {
            config.feed.information_url = url;
        }
        if let Some(secs) = lookup("BIKE_TIMEOUT_SECS") {
            config.feed = config.feed.with_timeout(parse_var("BIKE_TIMEOUT_SECS", secs)?);
        }
        if let Some(flag) = lookup("BIKE_ACTIVE_ONLY") {
            config.feed = config
                .feed
                .with_active_only(parse_var("BIKE_ACTIVE_ONLY", flag)?);
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            feed: FeedConfig::default(),
            mock_dir: None,
            seed: None,
        }
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            var,
            message: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
        assert!(config.mock_dir.is_none());
        assert!(config.seed.is_none());
        assert!(config.feed.active_only);
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIKE_BIND_ADDR", "0.0.0.0:8080"),
            ("BIKE_STATIC_DIR", "/srv/static"),
            ("BIKE_MOCK_DIR", "data/mock_feed"),
            ("BIKE_SEED", "42"),
            ("BIKE_STATUS_URL", "http://feed/status.json"),
            ("BIKE_INFO_URL", "http://feed/info.json"),
            ("BIKE_TIMEOUT_SECS", "5"),
            ("BIKE_ACTIVE_ONLY", "false"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/static"));
        assert_eq!(config.mock_dir, Some(PathBuf::from("data/mock_feed")));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.feed.status_url, "http://feed/status.json");
        assert_eq!(config.feed.information_url, "http://feed/info.json");
        assert_eq!(config.feed.timeout_secs, 5);
        assert!(!config.feed.active_only);
    }

    #[test]
    fn bad_values_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("BIKE_BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(err.to_string().starts_with("BIKE_BIND_ADDR"));

        assert!(ServerConfig::from_lookup(lookup(&[("BIKE_SEED", "-1")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("BIKE_ACTIVE_ONLY", "yes")])).is_err());
    }

    #[test]
    fn builder() {
        let config = ServerConfig::new("127.0.0.1:9000".parse().unwrap())
            .with_static_dir("assets")
            .with_mock_dir("mock")
            .with_seed(7)
            .with_feed(FeedConfig::default().with_timeout(3));

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.static_dir, PathBuf::from("assets"));
        assert_eq!(config.mock_dir, Some(PathBuf::from("mock")));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.feed.timeout_secs, 3);
    }
}
