//! GBFS (General Bikeshare Feed Specification) feed client.
//!
//! A bike-share system publishes, among others:
//! - `station_information.json`: static attributes (name, location,
//!   capacity, region), changing rarely
//! - `station_status.json`: operational flags and live counts, changing
//!   every few seconds
//!
//! Both are shaped `{ "data": { "stations": [ ... ] } }`. This module fetches
//! them over HTTP (or from disk, for development) and decodes them into
//! domain records.

mod client;
mod convert;
mod error;
mod feed;
mod mock;
mod types;

pub use client::{FeedClient, FeedConfig};
pub use convert::{parse_information, parse_stations, parse_status};
pub use error::{FeedError, FetchError, ParseError};
pub use feed::{FeedSource, StationFeed};
pub use mock::MockFeed;
pub use types::{LastReported, StationInformationDto, StationStatusDto};
