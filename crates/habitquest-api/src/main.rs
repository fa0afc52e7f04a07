//! HabitQuest roll engine API server entry point.

use std::sync::{Arc, Mutex};

use habitquest_api::config::ApiConfig;
use habitquest_api::error::AppError;
use habitquest_api::routes;
use habitquest_api::state::AppState;
use habitquest_core::clock::SystemClock;
use habitquest_core::rng::{DeterministicRng, SeededRng};
use habitquest_event_store::memory_event_repository::InMemoryEventRepository;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting HabitQuest roll engine API server");

    let config = ApiConfig::from_env()?;

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = match config.rng_seed {
        Some(seed) => {
            tracing::info!(seed, "using seeded dice");
            Arc::new(Mutex::new(SeededRng::from_seed(seed)))
        }
        None => Arc::new(Mutex::new(SeededRng::from_os())),
    };
    let app_state = AppState::new(
        Arc::new(SystemClock),
        rng,
        Arc::new(InMemoryEventRepository::new()),
    );

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = routes::app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
