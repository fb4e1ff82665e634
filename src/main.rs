use axum::Router;
use lastmile::config::Config;
use lastmile::services::mapbox::{AuthMode, MapboxClient};
use lastmile::services::planner::HybridRoutePlanner;
use lastmile::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lastmile=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting lastmile API server");
    tracing::info!(
        min_distance_m = config.dropoff.min_distance_m,
        max_samples = config.dropoff.max_samples,
        "Drop-off search: min {:.0}m, default cutoff {:.0}m, {} samples max, {:?} per query",
        config.dropoff.min_distance_m,
        config.dropoff.default_cutoff_m,
        config.dropoff.max_samples,
        config.dropoff.query_timeout
    );

    let mapbox_client = if let Some(ref base_url) = config.mapbox_base_url {
        tracing::info!("Using Mapbox proxy at {}", base_url);
        MapboxClient::with_config(
            config.mapbox_api_key.clone(),
            base_url.clone(),
            AuthMode::BearerHeader,
        )
    } else {
        MapboxClient::new(config.mapbox_api_key.clone())
    }
    .with_limits(config.dropoff.query_timeout, config.dropoff.max_retries);

    let mapbox = Arc::new(mapbox_client);
    let planner = HybridRoutePlanner::new(mapbox.clone(), mapbox, config.dropoff.clone());

    // Create application state
    let state = Arc::new(AppState { planner });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", lastmile::routes::create_router(state.clone()))
        .merge(lastmile::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
