//! Tally - expense manager with a conversational assistant
//!
//! HTTP server exposing the expense REST API and the chat endpoint.

mod api;

use api::{create_router, AppState};
use std::sync::Arc;
use tally_core::{expense_tool_registry, ChatService, Config, GenAiChat, MemoryStore};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally_server=info,tally_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let config_path =
        std::env::var("TALLY_CONFIG").unwrap_or_else(|_| "tally.toml".to_string());
    let config = Config::load_or_default(&config_path)?;

    // Storage, seeded with demo data
    let store = Arc::new(MemoryStore::seeded());

    // Chat completion backend, if credentials are available
    let completion = match config.chat.resolve_api_key() {
        Some(api_key) => {
            tracing::info!(model = %config.chat.model, "Chat backend configured");
            Some(Arc::new(GenAiChat::with_api_key(&config.chat.model, &api_key))
                as Arc<dyn tally_core::ChatCompletion>)
        }
        None => {
            tracing::warn!(
                "No API key configured; chat endpoint will answer in degraded mode. \
                 Set one in the [chat] section or via OPENAI_API_KEY."
            );
            None
        }
    };

    let registry = expense_tool_registry(store.clone());
    let chat = Arc::new(
        ChatService::new(completion, registry).with_max_rounds(config.chat.max_rounds),
    );

    let state = AppState::new(store, chat);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.bind_addr();
    tracing::info!("Tally server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
