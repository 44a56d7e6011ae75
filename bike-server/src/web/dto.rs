//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Snapshot, StationRecord};
use crate::metrics::{self, HistogramBin, RegionCount, StatusClass, Summary};
use crate::nearby::NearbyStation;

/// Query for the station table.
#[derive(Debug, Deserialize)]
pub struct StationsQuery {
    /// Only stations in this region
    pub region: Option<String>,

    /// Sort column: `bikes`, `utilization`, `name` or `capacity`
    pub sort: Option<String>,
}

/// Query for station name search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Substring to look for in station names
    pub q: String,

    /// Maximum number of results (default 10, max 50)
    pub limit: Option<usize>,
}

/// Query for top-N rankings.
#[derive(Debug, Deserialize)]
pub struct TopQuery {
    /// Number of stations (default 5, max 100)
    pub n: Option<usize>,
}

/// Query for the nearest station.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,

    /// `bikes` (default) or `docks`
    pub want: Option<String>,
}

/// Exact station name lookup.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: String,
}

/// Query for the availability histograms.
#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Number of equal-width bins (default 15, max 50)
    pub bins: Option<usize>,
}

/// A station as shown to API clients.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub station_id: String,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub region_id: Option<String>,
    pub capacity: u32,
    pub bikes_available: u32,
    pub docks_available: u32,
    pub utilization_rate: f64,
    pub status: StatusClass,
    pub color: &'static str,
    pub is_renting: bool,
    pub is_returning: bool,
    pub is_installed: bool,
    /// RFC 3339
    pub last_reported: String,
}

impl StationResult {
    pub fn from_record(record: &StationRecord) -> Self {
        let status = record.status_class();
        Self {
            station_id: record.station_id.to_string(),
            name: record.name.clone(),
            lat: record.lat,
            lon: record.lon,
            region_id: record.region_id.as_ref().map(|r| r.to_string()),
            capacity: record.capacity,
            bikes_available: record.bikes_available,
            docks_available: record.docks_available,
            utilization_rate: record.utilization_rate,
            status,
            color: status.color(),
            is_renting: record.is_renting,
            is_returning: record.is_returning,
            is_installed: record.is_installed,
            last_reported: record.last_reported.to_rfc3339(),
        }
    }
}

/// Convert a list of records.
pub fn station_results<'a>(records: impl IntoIterator<Item = &'a StationRecord>) -> Vec<StationResult> {
    records.into_iter().map(StationResult::from_record).collect()
}

/// Full snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotResponse {
    /// RFC 3339
    pub generated_at: String,
    pub summary: Summary,
    pub stations: Vec<StationResult>,
}

impl SnapshotResponse {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            generated_at: snapshot.generated_at().to_rfc3339(),
            summary: snapshot.summary(),
            stations: station_results(snapshot.stations()),
        }
    }
}

/// Response to refresh and reload.
#[derive(Debug, Serialize)]
pub struct RegeneratedResponse {
    /// RFC 3339
    pub generated_at: String,
    pub summary: Summary,
}

impl RegeneratedResponse {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            generated_at: snapshot.generated_at().to_rfc3339(),
            summary: snapshot.summary(),
        }
    }
}

/// A list of stations.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    pub stations: Vec<StationResult>,
}

/// Stations per region.
#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub regions: Vec<RegionCount>,
}

/// Nearest station to a point.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub station: StationResult,
    pub distance_m: f64,
}

impl NearbyResponse {
    pub fn from_nearby(nearby: &NearbyStation<'_>) -> Self {
        Self {
            station: StationResult::from_record(nearby.station),
            distance_m: nearby.distance_m,
        }
    }
}

/// A station placed on the map.
#[derive(Debug, Serialize)]
pub struct MapMarker {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub region_id: Option<String>,
    pub capacity: u32,
    pub bikes_available: u32,
    pub docks_available: u32,
    pub color: &'static str,
    /// Circle radius in pixels, growing with the share of docks filled
    pub radius: f64,
}

impl MapMarker {
    /// `None` for stations without coordinates.
    pub fn from_record(record: &StationRecord) -> Option<Self> {
        let (lat, lon) = record.coordinates()?;
        Some(Self {
            station_id: record.station_id.to_string(),
            name: record.display_name().to_string(),
            lat,
            lon,
            region_id: record.region_id.as_ref().map(|r| r.to_string()),
            capacity: record.capacity,
            bikes_available: record.bikes_available,
            docks_available: record.docks_available,
            color: record.status_class().color(),
            radius: metrics::marker_radius(record.bikes_available, record.capacity),
        })
    }
}

/// Every station with coordinates.
#[derive(Debug, Serialize)]
pub struct MapResponse {
    pub markers: Vec<MapMarker>,
}

impl MapResponse {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            markers: snapshot.mappable().filter_map(MapMarker::from_record).collect(),
        }
    }
}

/// Distributions of bikes and utilization across stations.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub bikes_available: Vec<HistogramBin>,
    pub utilization_rate: Vec<HistogramBin>,
}

impl AnalyticsResponse {
    pub fn from_snapshot(snapshot: &Snapshot, bins: usize) -> Self {
        Self {
            bikes_available: snapshot.bikes_histogram(bins),
            utilization_rate: snapshot.utilization_histogram(bins),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
