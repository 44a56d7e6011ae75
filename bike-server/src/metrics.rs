//! Derived station metrics.
//!
//! Utilization, status classification, aggregate summaries and the ranking
//! and filtering queries the dashboard pages are built from. Every ranking
//! here is a stable sort, so ties keep feed order.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{RegionId, StationRecord};

/// Stations with more bikes than this are [`StatusClass::Ok`].
const LOW_BIKES_THRESHOLD: u32 = 3;

/// Bikes as a percentage of capacity, rounded to two decimals.
///
/// Returns `0.0` when capacity is zero.
pub fn utilization(bikes: u32, capacity: u32) -> f64 {
    total_utilization(u64::from(bikes), u64::from(capacity))
}

/// [`utilization`] over totals that may exceed `u32`.
pub fn total_utilization(bikes: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    let pct = bikes as f64 / capacity as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Map marker radius: 8 for an empty station, up to 13 for a full one.
pub fn marker_radius(bikes: u32, capacity: u32) -> f64 {
    8.0 + f64::from(bikes) / f64::from(capacity.max(1)) * 5.0
}

/// Availability class of a station, used for marker colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// More than three bikes.
    Ok,
    /// One to three bikes.
    Low,
    /// No bikes.
    Empty,
}

impl StatusClass {
    /// Marker colour for map and table rendering.
    pub fn color(self) -> &'static str {
        match self {
            StatusClass::Ok => "green",
            StatusClass::Low => "orange",
            StatusClass::Empty => "red",
        }
    }
}

pub fn status_class(bikes: u32) -> StatusClass {
    match bikes {
        0 => StatusClass::Empty,
        b if b <= LOW_BIKES_THRESHOLD => StatusClass::Low,
        _ => StatusClass::Ok,
    }
}

/// Aggregate figures over a set of stations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_stations: usize,
    pub total_bikes: u64,
    pub total_docks: u64,
    pub total_capacity: u64,
    /// Mean bikes per station; `0.0` when there are no stations.
    pub mean_bikes: f64,
    /// `utilization(total_bikes, total_capacity)`.
    pub utilization: f64,
    /// Stations currently renting bikes out.
    pub active_stations: usize,
    /// Stations with known coordinates.
    pub mappable_stations: usize,
}

pub fn summarize(stations: &[StationRecord]) -> Summary {
    let total_stations = stations.len();
    let total_bikes: u64 = stations.iter().map(|s| u64::from(s.bikes_available)).sum();
    let total_docks: u64 = stations.iter().map(|s| u64::from(s.docks_available)).sum();
    let total_capacity: u64 = stations.iter().map(|s| u64::from(s.capacity)).sum();

    let mean_bikes = if total_stations == 0 {
        0.0
    } else {
        total_bikes as f64 / total_stations as f64
    };

    Summary {
        total_stations,
        total_bikes,
        total_docks,
        total_capacity,
        mean_bikes,
        utilization: total_utilization(total_bikes, total_capacity),
        active_stations: stations.iter().filter(|s| s.is_renting).count(),
        mappable_stations: stations.iter().filter(|s| s.is_mappable()).count(),
    }
}

/// The `n` stations with the most bikes, most first.
pub fn top_by_bikes(stations: &[StationRecord], n: usize) -> Vec<&StationRecord> {
    let mut ranked: Vec<&StationRecord> = stations.iter().collect();
    ranked.sort_by_key(|s| Reverse(s.bikes_available));
    ranked.truncate(n);
    ranked
}

/// The `n` stations with the most free docks, most first.
pub fn top_by_docks(stations: &[StationRecord], n: usize) -> Vec<&StationRecord> {
    let mut ranked: Vec<&StationRecord> = stations.iter().collect();
    ranked.sort_by_key(|s| Reverse(s.docks_available));
    ranked.truncate(n);
    ranked
}

/// Stations in the given region. Stations with no region never match.
pub fn filter_by_region<'a>(
    stations: &'a [StationRecord],
    region: &RegionId,
) -> Vec<&'a StationRecord> {
    stations
        .iter()
        .filter(|s| s.region_id.as_ref() == Some(region))
        .collect()
}

/// Column to order the station table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Bikes,
    Utilization,
    Name,
    Capacity,
}

impl SortKey {
    /// Parse a query-string value such as `bikes` or `utilization`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bikes" | "bikes_available" => Some(SortKey::Bikes),
            "utilization" | "utilization_rate" => Some(SortKey::Utilization),
            "name" => Some(SortKey::Name),
            "capacity" => Some(SortKey::Capacity),
            _ => None,
        }
    }
}

/// All stations ordered descending by `key`.
///
/// Stations without a name sort after every named one.
pub fn sort_stations(stations: &[StationRecord], key: SortKey) -> Vec<&StationRecord> {
    let mut sorted: Vec<&StationRecord> = stations.iter().collect();
    match key {
        SortKey::Bikes => sorted.sort_by_key(|s| Reverse(s.bikes_available)),
        SortKey::Capacity => sorted.sort_by_key(|s| Reverse(s.capacity)),
        SortKey::Utilization => {
            sorted.sort_by(|a, b| b.utilization_rate.total_cmp(&a.utilization_rate))
        }
        // Option orders None first, so reversing puts unnamed stations last.
        SortKey::Name => sorted.sort_by(|a, b| b.name.cmp(&a.name)),
    }
    sorted
}

/// The first station whose name is exactly `name`.
pub fn find_by_name<'a>(stations: &'a [StationRecord], name: &str) -> Option<&'a StationRecord> {
    stations.iter().find(|s| s.name.as_deref() == Some(name))
}

/// Stations whose name contains `query`, case-insensitively, in feed order.
pub fn search_by_name<'a>(
    stations: &'a [StationRecord],
    query: &str,
    limit: usize,
) -> Vec<&'a StationRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    stations
        .iter()
        .filter(|s| {
            s.name
                .as_ref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .take(limit)
        .collect()
}

/// Number of stations in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    /// `None` groups stations with no region.
    pub region_id: Option<RegionId>,
    pub stations: usize,
}

/// Station count per region, largest first, ties by region id.
pub fn region_breakdown(stations: &[StationRecord]) -> Vec<RegionCount> {
    let mut counts: HashMap<Option<&RegionId>, usize> = HashMap::new();
    for station in stations {
        *counts.entry(station.region_id.as_ref()).or_default() += 1;
    }

    let mut breakdown: Vec<RegionCount> = counts
        .into_iter()
        .map(|(region_id, stations)| RegionCount {
            region_id: region_id.cloned(),
            stations,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.stations
            .cmp(&a.stations)
            .then_with(|| a.region_id.cmp(&b.region_id))
    });
    breakdown
}

/// Distinct regions present, sorted.
pub fn regions(stations: &[StationRecord]) -> Vec<&RegionId> {
    let mut regions: Vec<&RegionId> = stations
        .iter()
        .filter_map(|s| s.region_id.as_ref())
        .collect();
    regions.sort();
    regions.dedup();
    regions
}

/// One bucket of a [`histogram`]: `lower <= value < upper`, except that the
/// last bucket also holds `upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over the range of `values`.
///
/// Empty input gives no bins. If every value is the same there is a single
/// bin holding all of them.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    if bins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0; bins];
    for v in values {
        let i = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[i] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Distribution of bikes available across stations.
pub fn bikes_histogram(stations: &[StationRecord], bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = stations.iter().map(|s| f64::from(s.bikes_available)).collect();
    histogram(&values, bins)
}

/// Distribution of utilization rate across stations.
pub fn utilization_histogram(stations: &[StationRecord], bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = stations.iter().map(|s| s.utilization_rate).collect();
    histogram(&values, bins)
}
