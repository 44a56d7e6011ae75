//! Nearest-station lookup.
//!
//! Answers "where is the closest bike?" and "where can I drop this bike?"
//! for a coordinate. Only mappable stations take part.

use geo::{HaversineDistance, Point};
use serde::Serialize;

use crate::domain::StationRecord;

/// What the rider is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Want {
    /// A station with at least one bike.
    Bike,
    /// A station with at least one free dock.
    Dock,
}

impl Want {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bike" | "bikes" => Some(Want::Bike),
            "dock" | "docks" => Some(Want::Dock),
            _ => None,
        }
    }

    fn satisfied_by(self, station: &StationRecord) -> bool {
        match self {
            Want::Bike => station.bikes_available > 0,
            Want::Dock => station.docks_available > 0,
        }
    }
}

/// A station and its great-circle distance from the query point.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyStation<'a> {
    pub station: &'a StationRecord,
    pub distance_m: f64,
}

/// The closest mappable station satisfying `want`, if any.
///
/// Ties go to the station listed first.
pub fn nearest<'a>(
    stations: &'a [StationRecord],
    lat: f64,
    lon: f64,
    want: Want,
) -> Option<NearbyStation<'a>> {
    let origin = Point::new(lon, lat);

    stations
        .iter()
        .filter(|s| want.satisfied_by(s))
        .filter_map(|s| {
            let (s_lat, s_lon) = s.coordinates()?;
            Some(NearbyStation {
                station: s,
                distance_m: origin.haversine_distance(&Point::new(s_lon, s_lat)),
            })
        })
        .fold(None, |best: Option<NearbyStation<'a>>, candidate| match best {
            Some(b) if b.distance_m <= candidate.distance_m => Some(b),
            _ => Some(candidate),
        })
}
