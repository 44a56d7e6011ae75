//! Conversion from GBFS documents to domain types.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{RegionId, StationId, StationInfo, StationStatus};
use crate::reconcile::latest_per_station;

use super::error::ParseError;
use super::types::{LastReported, StationInformationDto, StationStatusDto};

/// Extract and decode the `data.stations` array of a GBFS document.
pub fn parse_stations<T: DeserializeOwned>(document: &Value) -> Result<Vec<T>, ParseError> {
    let stations = document
        .pointer("/data/stations")
        .and_then(Value::as_array)
        .ok_or(ParseError::MissingStations)?;

    stations
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            T::deserialize(entry).map_err(|e| ParseError::Entry {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Decode a `station_status.json` document.
///
/// With `active_only`, stations whose latest report is not both renting
/// and returning are dropped. Duplicate ids are collapsed to their latest
/// report first, so an older open report never stands in for a newer
/// closed one.
pub fn parse_status(document: &Value, active_only: bool) -> Result<Vec<StationStatus>, ParseError> {
    let dtos: Vec<StationStatusDto> = parse_stations(document)?;

    let statuses = dtos
        .into_iter()
        .enumerate()
        .map(|(index, dto)| convert_status(index, dto))
        .collect::<Result<Vec<_>, _>>()?;

    if !active_only {
        return Ok(statuses);
    }

    Ok(latest_per_station(&statuses)
        .into_iter()
        .filter(|s| s.is_renting && s.is_returning)
        .cloned()
        .collect())
}

/// Decode a `station_information.json` document.
pub fn parse_information(document: &Value) -> Result<Vec<StationInfo>, ParseError> {
    let dtos: Vec<StationInformationDto> = parse_stations(document)?;

    dtos.into_iter()
        .enumerate()
        .map(|(index, dto)| convert_information(index, dto))
        .collect()
}

fn station_id(index: usize, raw: &str) -> Result<StationId, ParseError> {
    StationId::parse(raw).map_err(|error| ParseError::StationId { index, error })
}

fn convert_status(index: usize, dto: StationStatusDto) -> Result<StationStatus, ParseError> {
    let station_id = station_id(index, &dto.station_id)?;

    let last_reported =
        parse_last_reported(&dto.last_reported).ok_or_else(|| ParseError::Timestamp {
            station_id: dto.station_id.clone(),
            value: match &dto.last_reported {
                LastReported::Posix(secs) => secs.to_string(),
                LastReported::Rfc3339(s) => s.clone(),
            },
        })?;

    Ok(StationStatus {
        station_id,
        is_renting: dto.is_renting,
        is_returning: dto.is_returning,
        is_installed: dto.is_installed,
        num_bikes_available: dto.num_bikes_available,
        num_docks_available: dto.num_docks_available,
        last_reported,
    })
}

fn convert_information(index: usize, dto: StationInformationDto) -> Result<StationInfo, ParseError> {
    Ok(StationInfo {
        station_id: station_id(index, &dto.station_id)?,
        name: dto.name,
        lat: dto.lat,
        lon: dto.lon,
        capacity: dto.capacity,
        region_id: dto.region_id.map(RegionId::new),
    })
}

fn parse_last_reported(value: &LastReported) -> Option<DateTime<Utc>> {
    match value {
        LastReported::Posix(secs) => Utc.timestamp_opt(*secs, 0).single(),
        LastReported::Rfc3339(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_entry(id: &str, renting: bool, returning: bool) -> Value {
        json!({
            "station_id": id,
            "num_bikes_available": 3,
            "num_docks_available": 7,
            "is_installed": true,
            "is_renting": renting,
            "is_returning": returning,
            "last_reported": 1_700_000_000
        })
    }

    fn document(stations: Vec<Value>) -> Value {
        json!({
            "last_updated": 1_700_000_100,
            "ttl": 60,
            "data": { "stations": stations }
        })
    }

    #[test]
    fn parse_stations_requires_nested_array() {
        let err = parse_stations::<StationStatusDto>(&json!({ "data": {} })).unwrap_err();
        assert!(matches!(err, ParseError::MissingStations));

        let err = parse_stations::<StationStatusDto>(&json!({ "stations": [] })).unwrap_err();
        assert!(matches!(err, ParseError::MissingStations));

        let err =
            parse_stations::<StationStatusDto>(&json!({ "data": { "stations": {} } })).unwrap_err();
        assert!(matches!(err, ParseError::MissingStations));
    }

    #[test]
    fn parse_stations_reports_bad_entry_index() {
        let doc = document(vec![
            status_entry("A", true, true),
            json!({ "station_id": "B" }),
        ]);

        let err = parse_stations::<StationStatusDto>(&doc).unwrap_err();
        assert!(matches!(err, ParseError::Entry { index: 1, .. }));
    }

    #[test]
    fn parse_empty_station_list() {
        let statuses = parse_status(&document(vec![]), true).unwrap();
        assert!(statuses.is_empty());
    }

    #[test]
    fn parse_status_converts_fields() {
        let doc = document(vec![status_entry("A", true, true)]);

        let statuses = parse_status(&doc, false).unwrap();

        assert_eq!(statuses.len(), 1);
        let s = &statuses[0];
        assert_eq!(s.station_id.as_str(), "A");
        assert_eq!(s.num_bikes_available, 3);
        assert_eq!(s.num_docks_available, 7);
        assert_eq!(s.last_reported.timestamp(), 1_700_000_000);
    }

    #[test]
    fn active_only_drops_closed_stations() {
        let doc = document(vec![
            status_entry("A", true, true),
            status_entry("B", false, true),
            status_entry("C", true, false),
            status_entry("D", true, true),
        ]);

        let active: Vec<_> = parse_status(&doc, true)
            .unwrap()
            .into_iter()
            .map(|s| s.station_id.to_string())
            .collect();
        assert_eq!(active, vec!["A", "D"]);

        assert_eq!(parse_status(&doc, false).unwrap().len(), 4);
    }

    #[test]
    fn parse_status_rejects_empty_id() {
        let doc = document(vec![status_entry("", true, true)]);
        let err = parse_status(&doc, false).unwrap_err();
        assert!(matches!(err, ParseError::StationId { index: 0, .. }));
    }

    #[test]
    fn parse_status_rejects_bad_timestamp() {
        let mut entry = status_entry("A", true, true);
        entry["last_reported"] = json!("yesterday");
        let err = parse_status(&document(vec![entry]), false).unwrap_err();
        assert!(matches!(err, ParseError::Timestamp { .. }));
    }

    fn reported(mut entry: Value, secs: i64) -> Value {
        entry["last_reported"] = json!(secs);
        entry
    }

    #[test]
    fn active_only_judges_latest_report() {
        // Open at 100, closed at 200: the station is closed.
        let doc = document(vec![
            reported(status_entry("A", true, true), 100),
            reported(status_entry("A", false, true), 200),
            reported(status_entry("B", true, true), 100),
        ]);

        let statuses = parse_status(&doc, true).unwrap();
        let ids: Vec<&str> = statuses.iter().map(|s| s.station_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);

        let records = crate::reconcile::reconcile(&statuses, &[]);
        assert!(records.iter().all(|r| r.station_id.as_str() != "A"));
    }

    #[test]
    fn active_only_keeps_reopened_station_at_latest_report() {
        // Closed at 100, open again at 200.
        let doc = document(vec![
            reported(status_entry("A", false, true), 100),
            reported(status_entry("A", true, true), 200),
        ]);

        let statuses = parse_status(&doc, true).unwrap();

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].last_reported.timestamp(), 200);
    }

    #[test]
    fn parse_status_accepts_rfc3339() {
        let mut entry = status_entry("A", true, true);
        entry["last_reported"] = json!("2023-11-14T22:13:20Z");
        let statuses = parse_status(&document(vec![entry]), false).unwrap();
        assert_eq!(statuses[0].last_reported.timestamp(), 1_700_000_000);
    }

    #[test]
    fn parse_information_converts_fields() {
        let doc = document(vec![json!({
            "station_id": "00010137",
            "name": "Tokyo Station Yaesu",
            "lat": 35.6812,
            "lon": 139.7671,
            "capacity": 24,
            "region_id": "1"
        })]);

        let infos = parse_information(&doc).unwrap();

        assert_eq!(infos.len(), 1);
        let i = &infos[0];
        assert_eq!(i.station_id.as_str(), "00010137");
        assert_eq!(i.name, "Tokyo Station Yaesu");
        assert_eq!(i.capacity, 24);
        assert_eq!(i.region_id, Some(RegionId::new("1")));
    }
}
