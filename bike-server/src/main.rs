use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bike_server::availability::RandomAvailability;
use bike_server::config::ServerConfig;
use bike_server::gbfs::{FeedClient, FeedSource, MockFeed};
use bike_server::session::Session;
use bike_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let feed = match &config.mock_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using mock feed");
            FeedSource::Mock(MockFeed::new(dir)?.with_active_only(config.feed.active_only))
        }
        None => {
            info!(
                status = %config.feed.status_url,
                information = %config.feed.information_url,
                "using live feed"
            );
            FeedSource::Live(FeedClient::new(config.feed.clone())?)
        }
    };

    let availability = match config.seed {
        Some(seed) => RandomAvailability::seeded(seed),
        None => RandomAvailability::new(),
    };

    // The first request materializes the snapshot.
    let state = AppState::new(Session::new(feed, availability));
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Bike share dashboard listening on http://{}", config.bind_addr);
    info!("API endpoints:");
    info!("  GET  /health            - Health check");
    info!("  GET  /api/snapshot      - All stations with summary");
    info!("  POST /api/refresh       - Redraw availability");
    info!("  POST /api/reload        - Re-fetch feeds");
    info!("  GET  /api/stations      - Filter by region, sort");
    info!("  GET  /api/top/bikes     - Most bikes available");
    info!("  GET  /api/nearby        - Nearest station with a bike or dock");

    axum::serve(listener, app).await?;
    Ok(())
}
