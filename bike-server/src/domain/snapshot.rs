//! Point-in-time station collections.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::{self, HistogramBin, RegionCount, SortKey, Summary};

use super::record::StationRecord;
use super::station::{RegionId, StationId};

/// An ordered collection of station records plus its generation time.
///
/// Snapshots are immutable: a refresh builds a new one rather than editing
/// records in place.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    stations: Vec<StationRecord>,
    generated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(stations: Vec<StationRecord>, generated_at: DateTime<Utc>) -> Self {
        Self {
            stations,
            generated_at,
        }
    }

    /// Stations in feed order.
    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Look up a station by id.
    pub fn get(&self, id: &StationId) -> Option<&StationRecord> {
        self.stations.iter().find(|s| &s.station_id == id)
    }

    /// Stations that can be drawn on a map.
    pub fn mappable(&self) -> impl Iterator<Item = &StationRecord> {
        self.stations.iter().filter(|s| s.is_mappable())
    }

    pub fn summary(&self) -> Summary {
        metrics::summarize(&self.stations)
    }

    pub fn top_by_bikes(&self, n: usize) -> Vec<&StationRecord> {
        metrics::top_by_bikes(&self.stations, n)
    }

    pub fn top_by_docks(&self, n: usize) -> Vec<&StationRecord> {
        metrics::top_by_docks(&self.stations, n)
    }

    pub fn filter_by_region(&self, region: &RegionId) -> Vec<&StationRecord> {
        metrics::filter_by_region(&self.stations, region)
    }

    pub fn sorted_by(&self, key: SortKey) -> Vec<&StationRecord> {
        metrics::sort_stations(&self.stations, key)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&StationRecord> {
        metrics::find_by_name(&self.stations, name)
    }

    pub fn search_by_name(&self, query: &str, limit: usize) -> Vec<&StationRecord> {
        metrics::search_by_name(&self.stations, query, limit)
    }

    pub fn region_breakdown(&self) -> Vec<RegionCount> {
        metrics::region_breakdown(&self.stations)
    }

    pub fn regions(&self) -> Vec<&RegionId> {
        metrics::regions(&self.stations)
    }

    pub fn bikes_histogram(&self, bins: usize) -> Vec<HistogramBin> {
        metrics::bikes_histogram(&self.stations, bins)
    }

    pub fn utilization_histogram(&self, bins: usize) -> Vec<HistogramBin> {
        metrics::utilization_histogram(&self.stations, bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::*;

    #[test]
    fn lookup_by_id() {
        let snapshot = Snapshot::new(vec![record("A", 10, 1), record("B", 10, 2)], Utc::now());

        assert_eq!(snapshot.get(&id("B")).map(|s| s.bikes_available), Some(2));
        assert!(snapshot.get(&id("C")).is_none());
    }

    #[test]
    fn mappable_excludes_unmatched_stations() {
        let unmatched = StationRecord::join(&status("X", 1, 1, 1_700_000_000), None);
        let snapshot = Snapshot::new(vec![record("A", 10, 1), unmatched], Utc::now());

        let ids: Vec<_> = snapshot.mappable().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["A"]);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = Snapshot::new(Vec::new(), Utc::now());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.summary().total_stations, 0);
        assert!(snapshot.top_by_bikes(5).is_empty());
    }
}
