//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{RegionId, Snapshot, StationRecord};
use crate::metrics::{SortKey, Summary};

/// How many stations the dashboard's "recent status" table lists.
const DASHBOARD_ROWS: usize = 10;

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Dashboard: headline metrics and the first few stations.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub summary: SummaryView,
    pub stations: Vec<StationRow>,
}

impl DashboardTemplate {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            summary: SummaryView::new(&snapshot.summary(), snapshot),
            stations: snapshot
                .stations()
                .iter()
                .take(DASHBOARD_ROWS)
                .map(StationRow::from_record)
                .collect(),
        }
    }
}

/// Station table with region filter and sort.
#[derive(Template)]
#[template(path = "stations.html")]
pub struct StationsTemplate {
    pub regions: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub stations: Vec<StationRow>,
    pub last_updated: String,
}

impl StationsTemplate {
    /// Stations in `region` (all if `None`), ordered by `sort`.
    pub fn new(snapshot: &Snapshot, region: Option<&RegionId>, sort: SortKey) -> Self {
        let mut regions = vec![SelectOption::new("", "All", region.is_none())];
        regions.extend(snapshot.regions().into_iter().map(|r| {
            SelectOption::new(r.as_str(), r.as_str(), Some(r) == region)
        }));

        let sorts = SORT_OPTIONS
            .iter()
            .map(|(key, value, label)| SelectOption::new(value, label, *key == sort))
            .collect();

        let stations = snapshot
            .sorted_by(sort)
            .into_iter()
            .filter(|s| region.is_none() || s.region_id.as_ref() == region)
            .map(StationRow::from_record)
            .collect();

        Self {
            regions,
            sorts,
            stations,
            last_updated: snapshot.generated_at().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

const SORT_OPTIONS: [(SortKey, &str, &str); 4] = [
    (SortKey::Bikes, "bikes", "Bikes Available"),
    (SortKey::Utilization, "utilization", "Utilization Rate"),
    (SortKey::Name, "name", "Station Name"),
    (SortKey::Capacity, "capacity", "Capacity"),
];

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// An `<option>` in a `<select>`.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

/// Headline figures, pre-formatted.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub total_stations: usize,
    pub total_bikes: u64,
    pub total_docks: u64,
    pub mean_bikes: String,
    pub utilization: String,
    pub active_stations: usize,
    pub last_updated: String,
}

impl SummaryView {
    pub fn new(summary: &Summary, snapshot: &Snapshot) -> Self {
        Self {
            total_stations: summary.total_stations,
            total_bikes: summary.total_bikes,
            total_docks: summary.total_docks,
            mean_bikes: format!("{:.1}", summary.mean_bikes),
            utilization: format!("{:.1}", summary.utilization),
            active_stations: summary.active_stations,
            last_updated: snapshot.generated_at().format("%H:%M:%S").to_string(),
        }
    }
}

/// One row of a station table.
#[derive(Debug, Clone)]
pub struct StationRow {
    pub station_id: String,
    pub name: String,
    pub region: String,
    pub bikes_available: u32,
    pub docks_available: u32,
    pub capacity: u32,
    pub utilization: String,
    pub status_class: &'static str,
}

impl StationRow {
    pub fn from_record(record: &StationRecord) -> Self {
        Self {
            station_id: record.station_id.to_string(),
            name: record.display_name().to_string(),
            region: record
                .region_id
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            bikes_available: record.bikes_available,
            docks_available: record.docks_available,
            capacity: record.capacity,
            utilization: format!("{:.2}", record.utilization_rate),
            status_class: record.status_class().color(),
        }
    }
}
