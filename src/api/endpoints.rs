//! API endpoint handlers
//!
//! HTTP ingress for callers outside the process. `/v1/broadcast` publishes
//! a raw intent without waiting; `/v1/gemini` and `/v1/openai` send a
//! correlated request and return the relay's response.

use crate::core::bus::BroadcastBus;
use crate::core::config::Config;
use crate::core::constants::action;
use crate::models::intent::Intent;
use crate::models::openai::{MessageItem, OpenAIRequest};
use crate::models::response::RelayResponse;
use crate::relay::client::{ClientError, RelayClient};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bus: BroadcastBus,
    pub client: RelayClient,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/v1/broadcast", post(broadcast))
        .route("/v1/gemini", post(ask_gemini))
        .route("/v1/openai", post(ask_openai))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct GeminiBody {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIBody {
    #[serde(default)]
    pub history: Vec<MessageItem>,
    #[serde(default)]
    pub enable_web: bool,
    #[serde(default)]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl OpenAIBody {
    fn into_request(self) -> Result<OpenAIRequest, serde_json::Error> {
        Ok(OpenAIRequest {
            enable_web: self.enable_web,
            allowed_domains: self.allowed_domains,
            model: self.model,
            country: self.country,
            city: self.city,
            region: self.region,
            timezone: self.timezone,
            ..OpenAIRequest::with_history(&self.history)?
        })
    }
}

/// POST /v1/broadcast - Publish an intent without waiting for a response
async fn broadcast(State(state): State<AppState>, Json(intent): Json<Intent>) -> Response {
    debug!("Broadcasting intent: action={}", intent.action);
    match state.bus.send(intent) {
        Ok(receivers) => (
            StatusCode::ACCEPTED,
            Json(json!({ "status": "accepted", "receivers": receivers })),
        )
            .into_response(),
        Err(e) => {
            warn!("Broadcast not delivered: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, &e.to_string())
        }
    }
}

/// POST /v1/gemini - Ask the Gemini relay and wait for its response
async fn ask_gemini(State(state): State<AppState>, Json(body): Json<GeminiBody>) -> Response {
    relay_reply(state.client.ask_gemini(body.prompt).await)
}

/// POST /v1/openai - Ask the OpenAI relay and wait for its response
async fn ask_openai(State(state): State<AppState>, Json(body): Json<OpenAIBody>) -> Response {
    let request = match body.into_request() {
        Ok(request) => request,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };
    relay_reply(state.client.ask_openai(request).await)
}

/// Relay errors are still a 200: the relay answered, the answer is an error
fn relay_reply(result: Result<RelayResponse, ClientError>) -> Response {
    match result {
        Ok(response) => Json(response).into_response(),
        Err(e @ ClientError::Timeout { .. }) => {
            warn!("{}", e);
            error_response(StatusCode::GATEWAY_TIMEOUT, &e.to_string())
        }
        Err(e) => {
            error!("Relay request failed: {}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "type": "error",
        "error": {
            "type": "relay_error",
            "message": message,
        }
    });
    (status, Json(body)).into_response()
}

/// GET / - Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "Porvida LLM Relay v0.1.0",
        "status": "running",
        "config": {
            "default_model": state.config.relay.default_model,
            "reply_timeout": state.config.relay.reply_timeout,
        },
        "actions": {
            "gemini_request": action::GEMINI_REQUEST,
            "gemini_response": action::GEMINI_RESPONSE,
            "openai_request": action::OPENAI_REQUEST,
            "openai_response": action::OPENAI_RESPONSE,
        },
        "endpoints": {
            "broadcast": "/v1/broadcast",
            "gemini": "/v1/gemini",
            "openai": "/v1/openai",
            "health": "/health",
        },
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "bus_receivers": state.bus.receiver_count(),
    }))
}
