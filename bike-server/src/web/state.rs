//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::availability::RandomAvailability;
use crate::gbfs::FeedSource;
use crate::session::Session;

/// The session the server runs: configured feed, random availability.
pub type DashboardSession = Session<FeedSource, RandomAvailability>;

/// Shared application state.
///
/// Requests take turns on the one session.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<DashboardSession>>,
}

impl AppState {
    pub fn new(session: DashboardSession) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}
