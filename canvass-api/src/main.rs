//! Canvass API Server Entry Point
//!
//! Bootstraps configuration, wires the in-memory store and Anthropic
//! providers, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use canvass_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState, AuthConfig};
use canvass_llm::{AnthropicModerator, AnthropicSummarizer};
use canvass_storage::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_config = ApiConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let api_key = api_config.anthropic_api_key.clone().ok_or_else(|| {
        ApiError::invalid_input(
            "ANTHROPIC_API_KEY is not set. Moderation and summarization require it.",
        )
    })?;

    let moderator = Arc::new(AnthropicModerator::new(
        api_key.clone(),
        api_config.anthropic_model.clone(),
    ));
    let summarizer = Arc::new(AnthropicSummarizer::new(
        api_key,
        api_config.anthropic_model.clone(),
    ));

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), store, moderator, summarizer);

    let app: Router = create_api_router(state, &api_config, auth_config)?;

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting Canvass API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
