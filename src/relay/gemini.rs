//! Gemini relay
//!
//! Answers `GEMINI_REQUEST` intents with a single-prompt chat call and
//! broadcasts the outcome as `GEMINI_RESPONSE`.

use crate::core::bus::BroadcastBus;
use crate::core::constants::action;
use crate::core::error::RelayError;
use crate::core::executor::SerialExecutor;
use crate::core::provider::GeminiChat;
use crate::models::gemini::GeminiRequest;
use crate::models::intent::Intent;
use crate::models::response::{RelayResponse, Reply};
use crate::relay::{Receiver, settle};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct GeminiRelay {
    chat: Arc<dyn GeminiChat>,
    bus: BroadcastBus,
    executor: SerialExecutor,
}

impl GeminiRelay {
    pub fn new(chat: Arc<dyn GeminiChat>, bus: BroadcastBus, executor: SerialExecutor) -> Self {
        Self {
            chat,
            bus,
            executor,
        }
    }

    /// Drain queued requests and stop the worker
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }
}

impl Receiver for GeminiRelay {
    fn on_receive(&self, intent: &Intent) {
        if !intent.is(action::GEMINI_REQUEST) {
            return;
        }
        let request = GeminiRequest::from_intent(intent);
        debug!(
            request_id = request.request_id.as_deref().unwrap_or("-"),
            "Gemini request received"
        );

        let chat = self.chat.clone();
        let bus = self.bus.clone();
        let queued = self.executor.execute(async move {
            let result = settle(
                "gemini",
                answer_prompt(chat.as_ref(), request.prompt.as_deref()),
            )
            .await;
            let response =
                RelayResponse::from_result(action::GEMINI_RESPONSE, request.request_id, result);
            // Best-effort: nobody listening is not our problem
            let _ = bus.send(response.into_intent());
        });
        if let Err(e) = queued {
            warn!("Dropping Gemini request: {}", e);
        }
    }
}

/// Run one prompt through the chat service
///
/// An empty or missing prompt is rejected without calling the service. If
/// the service reports an error, any text it also returned is discarded.
pub async fn answer_prompt(
    chat: &dyn GeminiChat,
    prompt: Option<&str>,
) -> Result<Reply, RelayError> {
    let prompt = match prompt {
        Some(p) if !p.is_empty() => p,
        _ => return Err(RelayError::EmptyPrompt),
    };

    let response = chat.chat_simple(prompt).await.map_err(|e| {
        error!(provider = chat.provider_name(), "Gemini chat failed: {:?}", e);
        RelayError::from(e)
    })?;

    match (response.text, response.error) {
        (_, Some(error)) => Err(RelayError::upstream(error)),
        (Some(text), None) => Ok(Reply::text(text)),
        (None, None) => Err(RelayError::EmptyResponse),
    }
}
