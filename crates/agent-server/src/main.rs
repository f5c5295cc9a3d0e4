//! site-assistant HTTP Server
//!
//! Axum-based server providing REST API and WebSocket endpoints for the
//! orchestrated website chatbot.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{GenerationOptions, LlmProvider, ModelBinding};
use agent_runtime::OpenAiProvider;
use site_assistant::{build_orchestrator, CannedUpdateFeed};

use crate::config::{ProviderKind, ServerConfig};
use crate::routes::api_routes;
use crate::state::AppState;

fn build_provider(config: &ServerConfig) -> agent_core::Result<Arc<dyn LlmProvider>> {
    match config.provider {
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::from_env()?)),
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(agent_runtime::OllamaProvider::from_env()?)),
        #[cfg(not(feature = "ollama"))]
        ProviderKind::Ollama => Err(agent_core::AgentError::Configuration(
            "Ollama support not compiled in".into(),
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment first so RUST_LOG from .env applies
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    // Initialize LLM provider
    let provider = build_provider(&config)?;

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {} ({})", provider.name(), config.model),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - turns will fail until it is", provider.name());
        }
    }

    // Build agents
    let model = ModelBinding::new(provider, GenerationOptions::for_model(&config.model));
    let orchestrator = build_orchestrator(Arc::new(CannedUpdateFeed::new()), model)?;

    tracing::info!("{} delegates to {} specialists:", orchestrator.name(), orchestrator.tools().len());
    for name in orchestrator.tools().names() {
        tracing::info!("  • {}", name);
    }

    let state = AppState::new(orchestrator, config.run_config());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api_routes()
        // Static files (WASM frontend)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 site-assistant server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /api/welcome   - Welcome message");
    tracing::info!("  POST /api/chat      - Send message");
    tracing::info!("  GET  /api/chat/ws   - WebSocket chat");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
