//! Merge of the status and information feeds.
//!
//! The status feed is the primary side of a left outer join on station id:
//! every status entry yields a record, info-side fields are attached when a
//! matching info entry exists and left null otherwise.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{StationId, StationInfo, StationRecord, StationStatus};

/// Join status records with info records by station id.
///
/// - Output follows status order. A station listed more than once in the
///   status feed appears once, at its first position, carrying the entry
///   with the latest `last_reported` (ties go to the later entry).
/// - Duplicate ids in the info feed: the later entry wins.
/// - Status entries without info produce records with null name,
///   coordinates and region.
pub fn reconcile(statuses: &[StationStatus], infos: &[StationInfo]) -> Vec<StationRecord> {
    let info_by_id: HashMap<&StationId, &StationInfo> =
        infos.iter().map(|info| (&info.station_id, info)).collect();

    let latest = latest_per_station(statuses);

    let records: Vec<StationRecord> = latest
        .iter()
        .map(|status| StationRecord::join(status, info_by_id.get(&status.station_id).copied()))
        .collect();

    let unmatched = records.iter().filter(|r| r.name.is_none()).count();
    debug!(
        statuses = statuses.len(),
        infos = infos.len(),
        stations = records.len(),
        unmatched,
        "reconciled station feeds"
    );

    records
}

/// Keep one status per station: the most recently reported one, at the
/// station's first position.
pub(crate) fn latest_per_station(statuses: &[StationStatus]) -> Vec<&StationStatus> {
    let mut position: HashMap<&StationId, usize> = HashMap::new();
    let mut kept: Vec<&StationStatus> = Vec::with_capacity(statuses.len());

    for status in statuses {
        match position.get(&status.station_id) {
            Some(&i) => {
                if status.last_reported >= kept[i].last_reported {
                    kept[i] = status;
                }
            }
            None => {
                position.insert(&status.station_id, kept.len());
                kept.push(status);
            }
        }
    }

    kept
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::fixtures::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    /// Status entries drawn from a small id pool so duplicates are common.
    fn arb_statuses() -> impl Strategy<Value = Vec<StationStatus>> {
        prop::collection::vec(("[A-E]", 0u32..20, 0u32..20, 0i64..1000), 0..20).prop_map(
            |entries| {
                entries
                    .into_iter()
                    .map(|(id, bikes, docks, at)| status(&id, bikes, docks, at))
                    .collect()
            },
        )
    }

    fn arb_infos() -> impl Strategy<Value = Vec<StationInfo>> {
        prop::collection::vec(("[A-G]", 0u32..40), 0..10).prop_map(|entries| {
            entries
                .into_iter()
                .map(|(id, capacity)| info(&id, &format!("Station {id}"), capacity, None))
                .collect()
        })
    }

    proptest! {
        /// One record per distinct status id, in order of first appearance
        #[test]
        fn one_record_per_status_id(statuses in arb_statuses(), infos in arb_infos()) {
            let records = reconcile(&statuses, &infos);

            let mut seen = HashSet::new();
            let expected: Vec<&StationId> = statuses
                .iter()
                .map(|s| &s.station_id)
                .filter(|id| seen.insert(*id))
                .collect();
            let actual: Vec<&StationId> = records.iter().map(|r| &r.station_id).collect();

            prop_assert_eq!(actual, expected);
        }

        /// Each surviving record carries the maximum last_reported for its id
        #[test]
        fn keeps_latest_report(statuses in arb_statuses()) {
            let records = reconcile(&statuses, &[]);

            for record in &records {
                let max = statuses
                    .iter()
                    .filter(|s| s.station_id == record.station_id)
                    .map(|s| s.last_reported)
                    .max()
                    .unwrap();
                prop_assert_eq!(record.last_reported, max);
            }
        }

        /// Records are mappable exactly when an info entry matched
        #[test]
        fn mappable_iff_matched(statuses in arb_statuses(), infos in arb_infos()) {
            let info_ids: HashSet<&StationId> = infos.iter().map(|i| &i.station_id).collect();

            for record in reconcile(&statuses, &infos) {
                prop_assert_eq!(record.is_mappable(), info_ids.contains(&record.station_id));
            }
        }

        /// Display counts always fit capacity
        #[test]
        fn counts_fit_capacity(statuses in arb_statuses(), infos in arb_infos()) {
            for record in reconcile(&statuses, &infos) {
                prop_assert!(record.bikes_available <= record.capacity);
                prop_assert_eq!(record.bikes_available + record.docks_available, record.capacity);
            }
        }
    }
}
