use std::sync::Arc;

use anyhow::Context;
use chat_contracts::{config::ServerConfig, routes, state::AppState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(config.startup.clone(), config.endpoints.clone()));

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router().with_state(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    tracing::info!(
        addr = %config.addr,
        endpoints = ?config.endpoints.enabled(),
        "contract server listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
