use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_advice_api::config::ServerConfig;
use travel_advice_api::router::build_app_router;
use travel_advice_api::state::AppState;
use travel_advice_core::EditionLifecycle;
use travel_advice_db::PgEditionStore;
use travel_advice_publishing::{AssetManagerClient, DownstreamConfig, PublishingApiClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_advice_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let downstream = DownstreamConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = travel_advice_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    travel_advice_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    travel_advice_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Downstream clients ---
    let http = travel_advice_publishing::build_http_client().expect("Failed to build HTTP client");
    let publishing_api = PublishingApiClient::new(
        http.clone(),
        downstream.publishing_api_url.clone(),
        downstream.publishing_api_bearer_token.clone(),
    );
    let asset_manager = AssetManagerClient::new(
        http,
        downstream.asset_manager_url.clone(),
        downstream.asset_manager_bearer_token.clone(),
    );
    tracing::info!(
        publishing_api = %downstream.publishing_api_url,
        asset_manager = %downstream.asset_manager_url,
        "Downstream clients configured"
    );

    // --- App state ---
    let lifecycle = EditionLifecycle::new(
        Arc::new(PgEditionStore::new(pool)),
        Arc::new(publishing_api),
        Arc::new(asset_manager),
    );
    let state = AppState { lifecycle };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
