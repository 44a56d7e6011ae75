//! Session store.
//!
//! A [`Session`] owns the reconciled station list and the snapshot derived
//! from it. It starts uninitialized; the first read fetches both feeds,
//! reconciles them and draws availability. Later reads return the stored
//! snapshot without touching the network.
//!
//! [`Session::refresh`] only redraws availability over the stations already
//! loaded. [`Session::reload`] is the path that re-fetches the feeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::availability::{AvailabilitySource, RandomAvailability};
use crate::domain::{RegionId, Snapshot, StationRecord};
use crate::gbfs::{FeedError, StationFeed};
use crate::metrics::Summary;
use crate::reconcile::reconcile;

enum SessionState {
    Uninitialized,
    Materialized {
        /// Reconciled stations before availability is drawn.
        base: Vec<StationRecord>,
        snapshot: Arc<Snapshot>,
    },
}

/// One dashboard session over a station feed.
pub struct Session<F, A = RandomAvailability> {
    feed: F,
    availability: A,
    state: SessionState,
}

impl<F, A> Session<F, A>
where
    F: StationFeed,
    A: AvailabilitySource,
{
    pub fn new(feed: F, availability: A) -> Self {
        Self {
            feed,
            availability,
            state: SessionState::Uninitialized,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.state, SessionState::Materialized { .. })
    }

    /// The stored snapshot, without materializing.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        match &self.state {
            SessionState::Uninitialized => None,
            SessionState::Materialized { snapshot, .. } => Some(Arc::clone(snapshot)),
        }
    }

    /// When the stored snapshot was generated.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.current().map(|s| s.generated_at())
    }

    /// The current snapshot, materializing it on first use.
    pub async fn get_snapshot(&mut self) -> Result<Arc<Snapshot>, FeedError> {
        if let SessionState::Materialized { snapshot, .. } = &self.state {
            return Ok(Arc::clone(snapshot));
        }
        self.reload().await
    }

    /// Redraw availability over the loaded stations and replace the snapshot.
    ///
    /// Does not re-fetch. An uninitialized session is materialized instead.
    pub async fn refresh(&mut self) -> Result<Arc<Snapshot>, FeedError> {
        let SessionState::Materialized { base, snapshot } = &mut self.state else {
            return self.reload().await;
        };

        let regenerated = Arc::new(Snapshot::new(
            self.availability.assign_all(base),
            Utc::now(),
        ));
        *snapshot = Arc::clone(&regenerated);

        info!(stations = regenerated.len(), "regenerated station availability");
        Ok(regenerated)
    }

    /// Re-fetch both feeds, reconcile and regenerate.
    ///
    /// On failure the previous state is kept.
    pub async fn reload(&mut self) -> Result<Arc<Snapshot>, FeedError> {
        let fetched = futures::try_join!(self.feed.fetch_status(), self.feed.fetch_information());

        let (statuses, infos) = match fetched {
            Ok(feeds) => feeds,
            Err(e) => {
                warn!(error = %e, "failed to fetch station feeds");
                return Err(e);
            }
        };

        let base = reconcile(&statuses, &infos);
        let snapshot = Arc::new(Snapshot::new(
            self.availability.assign_all(&base),
            Utc::now(),
        ));

        info!(stations = snapshot.len(), "materialized station snapshot");

        self.state = SessionState::Materialized {
            base,
            snapshot: Arc::clone(&snapshot),
        };
        Ok(snapshot)
    }

    pub async fn top_by_bikes(&mut self, n: usize) -> Result<Vec<StationRecord>, FeedError> {
        let snapshot = self.get_snapshot().await?;
        Ok(snapshot.top_by_bikes(n).into_iter().cloned().collect())
    }

    pub async fn top_by_docks(&mut self, n: usize) -> Result<Vec<StationRecord>, FeedError> {
        let snapshot = self.get_snapshot().await?;
        Ok(snapshot.top_by_docks(n).into_iter().cloned().collect())
    }

    pub async fn filter_by_region(
        &mut self,
        region: &RegionId,
    ) -> Result<Vec<StationRecord>, FeedError> {
        let snapshot = self.get_snapshot().await?;
        Ok(snapshot.filter_by_region(region).into_iter().cloned().collect())
    }

    pub async fn summaries(&mut self) -> Result<Summary, FeedError> {
        Ok(self.get_snapshot().await?.summary())
    }
}
