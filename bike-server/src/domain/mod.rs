//! Domain types for the bike station dashboard.
//!
//! These types are independent of the GBFS wire format: the feed layer
//! converts into them and everything downstream consumes them.

mod record;
mod snapshot;
mod station;

pub use record::{StationInfo, StationRecord, StationStatus};
pub use snapshot::Snapshot;
pub use station::{InvalidStationId, RegionId, StationId};

#[cfg(test)]
pub(crate) use record::fixtures;
