use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_advice_core::EditionLifecycle;
use travel_advice_db::PgEditionStore;
use travel_advice_publishing::{AssetManagerClient, DownstreamConfig, PublishingApiClient};
use travel_advice_worker::{index_content_id, run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_advice_worker=debug,travel_advice_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let lifecycle = match build_lifecycle().await {
        Ok(lifecycle) => lifecycle,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Worker startup failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(command = ?cli.command, "Running task");
    match run(&lifecycle, &cli.command, &index_content_id()).await {
        Ok(()) => {
            tracing::info!("Task finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Task failed");
            ExitCode::FAILURE
        }
    }
}

async fn build_lifecycle() -> anyhow::Result<EditionLifecycle> {
    use anyhow::Context;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = travel_advice_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    let downstream = DownstreamConfig::from_env();
    let http = travel_advice_publishing::build_http_client()?;
    let publishing_api = PublishingApiClient::new(
        http.clone(),
        downstream.publishing_api_url,
        downstream.publishing_api_bearer_token,
    );
    let asset_manager = AssetManagerClient::new(
        http,
        downstream.asset_manager_url,
        downstream.asset_manager_bearer_token,
    );

    Ok(EditionLifecycle::new(
        Arc::new(PgEditionStore::new(pool)),
        Arc::new(publishing_api),
        Arc::new(asset_manager),
    ))
}
