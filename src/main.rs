use axum::{routing::get, Router};
use marketsim::config::Config;
use marketsim::services::{seed, Simulator, StockStore, TickGenerator};
use marketsim::websocket::{self, RoomManager};
use marketsim::{api, AppState};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketsim=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting marketsim server on {}:{}", config.host, config.port);

    // Open the instrument store and seed the default universe on first run
    let store = Arc::new(StockStore::new(&config.database_path, config.history_cap)?);
    seed::seed_if_empty(&store)?;

    // Room manager for WebSocket subscriptions
    let rooms = RoomManager::new();

    // Start the simulation loop
    let simulator = Simulator::new(
        store.clone(),
        rooms.clone(),
        TickGenerator::new(config.scaling_factor),
        Duration::from_millis(config.tick_interval_ms),
    );
    let sim_handle = simulator.spawn();
    info!(
        "Simulation loop started (interval {}ms, history cap {})",
        config.tick_interval_ms, config.history_cap
    );

    // Create application state
    let state = AppState {
        config: config.clone(),
        store,
        rooms,
    };

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = Router::new()
        .merge(api::router())
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("marketsim listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let an in-flight sweep finish before exiting
    sim_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
