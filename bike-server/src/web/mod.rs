//! Web layer for the station dashboard.
//!
//! Serves the dashboard pages and a JSON API over the session's snapshot.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, DashboardSession};
pub use templates::*;
