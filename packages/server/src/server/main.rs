// Main entry point for the analyzer API server

use anyhow::{Context, Result};
use server_core::{kernel::ServerDeps, server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Instagram Interaction Analyzer API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        operator = config.operator_username.as_deref().unwrap_or("<none>"),
        credentialed = config.apify_operator_token.is_some(),
        likers_actor = config.apify_likers_actor.as_deref().unwrap_or("<none>"),
        max_concurrent = config.max_concurrent_analyses,
        "Configuration loaded"
    );

    let deps = ServerDeps::from_config(&config);
    let app = build_app(deps);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: {}/health", config.public_base_url);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
