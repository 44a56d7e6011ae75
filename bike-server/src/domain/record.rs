//! Station records: the two feed-side views and their reconciled union.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{StatusClass, status_class, utilization};

use super::station::{RegionId, StationId};

/// Static station attributes from the information feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub station_id: StationId,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
    pub region_id: Option<RegionId>,
}

/// Operational state from the status feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StationStatus {
    pub station_id: StationId,
    pub is_renting: bool,
    pub is_returning: bool,
    pub is_installed: bool,
    pub num_bikes_available: u32,
    pub num_docks_available: u32,
    pub last_reported: DateTime<Utc>,
}

/// A reconciled station: status fields joined with (optional) info fields.
///
/// Invariant: `bikes_available + docks_available == capacity`. Both
/// [`StationRecord::join`] and [`StationRecord::with_availability`] uphold it,
/// so code that only goes through those can rely on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station_id: StationId,

    /// `None` when the station is missing from the information feed.
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub region_id: Option<RegionId>,

    pub capacity: u32,

    pub is_renting: bool,
    pub is_returning: bool,
    pub is_installed: bool,

    /// Counts as published by the status feed.
    pub reported_bikes_available: u32,
    pub reported_docks_available: u32,
    pub last_reported: DateTime<Utc>,

    /// Counts used for display; overridden by the availability source.
    pub bikes_available: u32,
    pub docks_available: u32,
    pub utilization_rate: f64,
}

impl StationRecord {
    /// Join a status entry with its matching info entry, if any.
    ///
    /// Status-side fields win for operational flags, info-side fields for
    /// static attributes. Without info, capacity is taken to be the number
    /// of docks the status feed accounted for (bikes plus free docks).
    /// Initial display counts are the reported ones, clamped to capacity.
    pub fn join(status: &StationStatus, info: Option<&StationInfo>) -> Self {
        let capacity = match info {
            Some(info) => info.capacity,
            None => status
                .num_bikes_available
                .saturating_add(status.num_docks_available),
        };

        let record = Self {
            station_id: status.station_id.clone(),
            name: info.map(|i| i.name.clone()),
            lat: info.map(|i| i.lat),
            lon: info.map(|i| i.lon),
            region_id: info.and_then(|i| i.region_id.clone()),
            capacity,
            is_renting: status.is_renting,
            is_returning: status.is_returning,
            is_installed: status.is_installed,
            reported_bikes_available: status.num_bikes_available,
            reported_docks_available: status.num_docks_available,
            last_reported: status.last_reported,
            bikes_available: 0,
            docks_available: 0,
            utilization_rate: 0.0,
        };

        let bikes = status.num_bikes_available;
        record.with_availability(bikes)
    }

    /// Replace the display counts.
    ///
    /// `bikes` is clamped to capacity; docks are the complement.
    pub fn with_availability(mut self, bikes: u32) -> Self {
        let bikes = bikes.min(self.capacity);
        self.bikes_available = bikes;
        self.docks_available = self.capacity - bikes;
        self.utilization_rate = utilization(bikes, self.capacity);
        self
    }

    /// Whether the station has coordinates and can be placed on a map.
    pub fn is_mappable(&self) -> bool {
        self.coordinates().is_some()
    }

    /// `(lat, lon)` if both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// Station name, falling back to the id for unmatched stations.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.station_id.as_str())
    }

    pub fn status_class(&self) -> StatusClass {
        status_class(self.bikes_available)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Builders shared by tests across the crate.

    use super::*;
    use chrono::TimeZone;

    pub fn id(s: &str) -> StationId {
        StationId::parse(s).unwrap()
    }

    pub fn reported_at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    pub fn status(station: &str, bikes: u32, docks: u32, last_reported: i64) -> StationStatus {
        StationStatus {
            station_id: id(station),
            is_renting: true,
            is_returning: true,
            is_installed: true,
            num_bikes_available: bikes,
            num_docks_available: docks,
            last_reported: reported_at(last_reported),
        }
    }

    pub fn info(station: &str, name: &str, capacity: u32, region: Option<&str>) -> StationInfo {
        StationInfo {
            station_id: id(station),
            name: name.to_string(),
            lat: 35.68,
            lon: 139.76,
            capacity,
            region_id: region.map(RegionId::new),
        }
    }

    /// A mapped record with the given capacity and display bikes.
    pub fn record(station: &str, capacity: u32, bikes: u32) -> StationRecord {
        let s = status(station, 0, capacity, 1_700_000_000);
        let i = info(station, &format!("Station {station}"), capacity, Some("1"));
        StationRecord::join(&s, Some(&i)).with_availability(bikes)
    }
}
