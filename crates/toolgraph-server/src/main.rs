//! toolgraph HTTP Server

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use toolgraph_core::{AgentBuilder, LlmProvider, PromptTemplate};
use toolgraph_runtime::DeepSeekProvider;
use toolgraph_server::{router, AppState, ServerConfig};
use toolgraph_tools::default_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize LLM provider
    let generation = config.deepseek.generation_options();
    let provider = Arc::new(DeepSeekProvider::from_config(config.deepseek.clone())?);

    if config.deepseek.api_key.is_empty() {
        tracing::warn!("DEEPSEEK_API_KEY is not set - chat requests will fail");
    }
    match provider.health_check().await {
        Ok(true) => tracing::info!(base_url = %config.deepseek.base_url, "Connected to DeepSeek"),
        Ok(false) | Err(_) => tracing::warn!("DeepSeek not reachable - agent will fail"),
    }

    // Initialize tools
    let tools = default_registry();
    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    let mut builder = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .generation(generation)
        .max_cycles(config.max_cycles);
    if let Some(path) = &config.prompt_file {
        builder = builder.prompt(PromptTemplate::from_file(path)?);
        tracing::info!(path = %path.display(), "Loaded prompt template");
    }
    let agent = builder.build()?;

    let app = router(AppState::new(agent));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("toolgraph server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /           - Welcome");
    tracing::info!("  GET  /health     - Health check");
    tracing::info!("  POST /api/chat   - Send message");
    tracing::info!("  GET  /api/tools  - List tools");
    tracing::info!("  POST /chat, GET /tools - Aliases");

    axum::serve(listener, app).await?;

    Ok(())
}
