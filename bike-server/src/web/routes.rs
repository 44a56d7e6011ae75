//! HTTP route handlers.

use std::path::Path;
use std::sync::Arc;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::domain::{RegionId, Snapshot, StationId, StationRecord};
use crate::gbfs::FeedError;
use crate::metrics::{SortKey, Summary};
use crate::nearby::{Want, nearest};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

const DEFAULT_TOP_N: usize = 5;
const MAX_TOP_N: usize = 100;
const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 50;
const DEFAULT_HISTOGRAM_BINS: usize = 15;
const MAX_HISTOGRAM_BINS: usize = 50;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(dashboard_page))
        .route("/stations", get(stations_page))
        .route("/health", get(health))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/refresh", post(refresh))
        .route("/api/reload", post(reload))
        .route("/api/summary", get(summary))
        .route("/api/stations", get(list_stations))
        .route("/api/stations/search", get(search_stations))
        .route("/api/stations/by-name", get(station_by_name))
        .route("/api/stations/:id", get(station_detail))
        .route("/api/top/bikes", get(top_bikes))
        .route("/api/top/docks", get(top_docks))
        .route("/api/regions", get(regions))
        .route("/api/nearby", get(nearby))
        .route("/api/map", get(map_markers))
        .route("/api/analytics", get(analytics))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The session's snapshot, materializing it if needed.
async fn current_snapshot(state: &AppState) -> Result<Arc<Snapshot>, AppError> {
    let mut session = state.session.lock().await;
    Ok(session.get_snapshot().await?)
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render(template: &impl Template) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })
}

/// Render the error page, for handlers that serve HTML.
fn error_page(status: StatusCode, title: &str, message: String) -> Response {
    let template = ErrorTemplate {
        title: title.to_string(),
        message,
    };
    let body = template
        .render()
        .unwrap_or_else(|e| format!("Template error: {}", e));
    (status, Html(body)).into_response()
}

/// Empty query values (as sent by an "All" option) mean no filter.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_sort(sort: Option<String>) -> Result<Option<SortKey>, AppError> {
    non_empty(sort)
        .map(|s| {
            SortKey::parse(&s).ok_or_else(|| AppError::BadRequest {
                message: format!("Invalid sort key: {s}"),
            })
        })
        .transpose()
}

fn parse_station_id(id: &str) -> Result<StationId, AppError> {
    StationId::parse(id).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn top_n(req: &TopQuery) -> usize {
    req.n.unwrap_or(DEFAULT_TOP_N).min(MAX_TOP_N)
}

// ============================================================================
// Pages
// ============================================================================

/// Dashboard: headline metrics and the first stations.
async fn dashboard_page(State(state): State<AppState>) -> Response {
    match current_snapshot(&state).await {
        Ok(snapshot) => match render(&DashboardTemplate::from_snapshot(&snapshot)) {
            Ok(html) => html.into_response(),
            Err(e) => e.into_response(),
        },
        Err(e) => error_page(
            StatusCode::BAD_GATEWAY,
            "Station data unavailable",
            e.to_string(),
        ),
    }
}

/// Station table with region filter and sort.
async fn stations_page(
    State(state): State<AppState>,
    query: Result<Query<StationsQuery>, QueryRejection>,
) -> Response {
    let req = match query {
        Ok(Query(req)) => req,
        Err(e) => return error_page(StatusCode::BAD_REQUEST, "Bad request", e.body_text()),
    };
    let sort = match parse_sort(req.sort) {
        Ok(sort) => sort.unwrap_or(SortKey::Bikes),
        Err(e) => return error_page(StatusCode::BAD_REQUEST, "Bad request", e.to_string()),
    };
    let region = non_empty(req.region).map(RegionId::new);

    let snapshot = match current_snapshot(&state).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            return error_page(
                StatusCode::BAD_GATEWAY,
                "Station data unavailable",
                e.to_string(),
            );
        }
    };

    match render(&StationsTemplate::new(&snapshot, region.as_ref(), sort)) {
        Ok(html) => html.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// JSON API
// ============================================================================

/// The whole snapshot.
async fn get_snapshot(State(state): State<AppState>) -> Result<Json<SnapshotResponse>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(SnapshotResponse::from_snapshot(&snapshot)))
}

/// Redraw availability without re-fetching.
///
/// Browsers posting the dashboard form are sent back to the dashboard.
async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let snapshot = state.session.lock().await.refresh().await?;
    info!(generated_at = %snapshot.generated_at(), "refreshed snapshot");

    if accepts_html(&headers) {
        Ok(Redirect::to("/").into_response())
    } else {
        Ok(Json(RegeneratedResponse::from_snapshot(&snapshot)).into_response())
    }
}

/// Re-fetch both feeds and regenerate.
async fn reload(State(state): State<AppState>) -> Result<Json<RegeneratedResponse>, AppError> {
    let snapshot = state.session.lock().await.reload().await?;
    info!(stations = snapshot.len(), "reloaded feeds");
    Ok(Json(RegeneratedResponse::from_snapshot(&snapshot)))
}

async fn summary(State(state): State<AppState>) -> Result<Json<Summary>, AppError> {
    let summary = state.session.lock().await.summaries().await?;
    Ok(Json(summary))
}

/// Stations, optionally restricted to a region and sorted.
///
/// Without `sort`, stations keep feed order.
async fn list_stations(
    State(state): State<AppState>,
    query: Result<Query<StationsQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, AppError> {
    let Query(req) = query?;
    let sort = parse_sort(req.sort)?;
    let region = non_empty(req.region).map(RegionId::new);

    let stations: Vec<StationRecord> = match (&region, sort) {
        (Some(region), None) => state.session.lock().await.filter_by_region(region).await?,
        _ => {
            let snapshot = current_snapshot(&state).await?;
            let ordered = match sort {
                Some(key) => snapshot.sorted_by(key),
                None => snapshot.stations().iter().collect(),
            };
            ordered
                .into_iter()
                .filter(|s| region.is_none() || s.region_id.as_ref() == region.as_ref())
                .cloned()
                .collect()
        }
    };

    Ok(Json(StationsResponse {
        stations: station_results(&stations),
    }))
}

/// Case-insensitive station name search.
async fn search_stations(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, AppError> {
    let Query(req) = query?;
    let limit = req.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
    let snapshot = current_snapshot(&state).await?;

    Ok(Json(StationsResponse {
        stations: station_results(snapshot.search_by_name(&req.q, limit)),
    }))
}

/// One station by exact name.
async fn station_by_name(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<StationResult>, AppError> {
    let Query(req) = query?;
    let snapshot = current_snapshot(&state).await?;

    snapshot
        .find_by_name(&req.name)
        .map(|record| Json(StationResult::from_record(record)))
        .ok_or_else(|| AppError::NotFound {
            message: format!("No station named {:?}", req.name),
        })
}

/// One station by id.
async fn station_detail(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<StationResult>, AppError> {
    let id = parse_station_id(&id)?;
    let snapshot = current_snapshot(&state).await?;

    snapshot
        .get(&id)
        .map(|record| Json(StationResult::from_record(record)))
        .ok_or_else(|| AppError::NotFound {
            message: format!("Station {id} not found"),
        })
}

async fn top_bikes(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, AppError> {
    let Query(req) = query?;
    let stations = state.session.lock().await.top_by_bikes(top_n(&req)).await?;
    Ok(Json(StationsResponse {
        stations: station_results(&stations),
    }))
}

async fn top_docks(
    State(state): State<AppState>,
    query: Result<Query<TopQuery>, QueryRejection>,
) -> Result<Json<StationsResponse>, AppError> {
    let Query(req) = query?;
    let stations = state.session.lock().await.top_by_docks(top_n(&req)).await?;
    Ok(Json(StationsResponse {
        stations: station_results(&stations),
    }))
}

/// Station count per region.
async fn regions(State(state): State<AppState>) -> Result<Json<RegionsResponse>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(RegionsResponse {
        regions: snapshot.region_breakdown(),
    }))
}

/// Nearest station with a bike (or a free dock).
async fn nearby(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Result<Json<NearbyResponse>, AppError> {
    let Query(req) = query?;
    if !(-90.0..=90.0).contains(&req.lat) || !(-180.0..=180.0).contains(&req.lon) {
        return Err(AppError::BadRequest {
            message: format!("Invalid coordinates: {}, {}", req.lat, req.lon),
        });
    }

    let want = match non_empty(req.want) {
        Some(w) => Want::parse(&w).ok_or_else(|| AppError::BadRequest {
            message: format!("Invalid want: {w} (expected bikes or docks)"),
        })?,
        None => Want::Bike,
    };

    let snapshot = current_snapshot(&state).await?;

    nearest(snapshot.stations(), req.lat, req.lon, want)
        .map(|found| Json(NearbyResponse::from_nearby(&found)))
        .ok_or_else(|| AppError::NotFound {
            message: "No station nearby has what you need".to_string(),
        })
}

/// Stations with coordinates, as map markers.
async fn map_markers(State(state): State<AppState>) -> Result<Json<MapResponse>, AppError> {
    let snapshot = current_snapshot(&state).await?;
    Ok(Json(MapResponse::from_snapshot(&snapshot)))
}

/// Histograms of bikes available and utilization.
async fn analytics(
    State(state): State<AppState>,
    query: Result<Query<AnalyticsQuery>, QueryRejection>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let Query(req) = query?;
    let bins = req.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS).min(MAX_HISTOGRAM_BINS);
    if bins == 0 {
        return Err(AppError::BadRequest {
            message: "bins must be at least 1".to_string(),
        });
    }

    let snapshot = current_snapshot(&state).await?;
    Ok(Json(AnalyticsResponse::from_snapshot(&snapshot, bins)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    /// A feed could not be fetched or decoded.
    Upstream { message: String },
    Internal { message: String },
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => f.write_str(message),
        }
    }
}

impl From<FeedError> for AppError {
    fn from(e: FeedError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
