//! HTTP Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use toolgraph_core::{AgentError, ToolSchema};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
    pub tools: usize,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolSchema>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Handlers
// ============================================================================

/// Welcome message
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the toolgraph agent API",
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.agent.provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);
    if !provider_connected {
        tracing::warn!(provider = provider.name(), "Provider health check failed");
    }

    Json(HealthResponse {
        status: if provider_connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.name().to_string(),
        provider_connected,
        tools: state.agent.tools().len(),
    })
}

/// Main chat endpoint
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let conversation_id = payload
        .conversation_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let response = state.agent.invoke(&payload.message).await.map_err(|e| {
        tracing::error!(%conversation_id, "Agent error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.user_message(),
                code: error_code(&e).into(),
            }),
        )
    })?;

    Ok(Json(ChatResponse {
        response,
        conversation_id,
    }))
}

/// Registered tools
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: state.agent.tools().schemas(),
    })
}

fn error_code(err: &AgentError) -> &'static str {
    match err {
        AgentError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
        AgentError::CycleLimitExceeded(_) => "CYCLE_LIMIT_EXCEEDED",
        _ => "AGENT_ERROR",
    }
}
