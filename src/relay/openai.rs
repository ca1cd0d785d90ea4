//! OpenAI relay
//!
//! Answers `OPENAI_REQUEST` intents with a multi-turn chat call and
//! broadcasts the text and citation URLs as `OPENAI_RESPONSE`.

use crate::core::bus::BroadcastBus;
use crate::core::constants::action;
use crate::core::error::RelayError;
use crate::core::executor::SerialExecutor;
use crate::core::provider::OpenAIChat;
use crate::models::intent::Intent;
use crate::models::openai::{ChatOptions, ChatResult, OpenAIRequest, decode_history};
use crate::models::response::{RelayResponse, Reply};
use crate::relay::{Receiver, settle};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct OpenAIRelay {
    chat: Arc<dyn OpenAIChat>,
    bus: BroadcastBus,
    executor: SerialExecutor,
    default_model: Arc<str>,
}

impl OpenAIRelay {
    pub fn new(
        chat: Arc<dyn OpenAIChat>,
        bus: BroadcastBus,
        executor: SerialExecutor,
        default_model: &str,
    ) -> Self {
        Self {
            chat,
            bus,
            executor,
            default_model: Arc::from(default_model),
        }
    }

    /// Drain queued requests and stop the worker
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }
}

impl Receiver for OpenAIRelay {
    fn on_receive(&self, intent: &Intent) {
        if !intent.is(action::OPENAI_REQUEST) {
            return;
        }
        let request = OpenAIRequest::from_intent(intent);
        debug!(
            request_id = request.request_id.as_deref().unwrap_or("-"),
            enable_web = request.enable_web,
            "OpenAI request received"
        );

        let chat = self.chat.clone();
        let bus = self.bus.clone();
        let default_model = self.default_model.clone();
        let queued = self.executor.execute(async move {
            let request_id = request.request_id.clone();
            let result = settle(
                "openai",
                answer_conversation(chat.as_ref(), request, &default_model),
            )
            .await;
            let response = RelayResponse::from_result(action::OPENAI_RESPONSE, request_id, result);
            let _ = bus.send(response.into_intent());
        });
        if let Err(e) = queued {
            warn!("Dropping OpenAI request: {}", e);
        }
    }
}

/// Decode the request, call the chat service and collect citation URLs
pub async fn answer_conversation(
    chat: &dyn OpenAIChat,
    request: OpenAIRequest,
    default_model: &str,
) -> Result<Reply, RelayError> {
    let history = match request.history_json.as_deref() {
        None | Some("") => Vec::new(),
        Some(json) => decode_history(json).map_err(|e| {
            error!("Failed to decode history: {}", e);
            RelayError::from(e)
        })?,
    };

    let options = ChatOptions {
        enable_web_search: request.enable_web,
        allowed_domains: request.domain_filter(),
        user_location: request.user_location(),
        model: request
            .model
            .unwrap_or_else(|| default_model.to_string()),
    };

    debug!(
        model = %options.model,
        turns = history.len(),
        "Calling {}",
        chat.provider_name()
    );

    let result = chat.chat(&history, &options).await.map_err(|e| {
        error!(provider = chat.provider_name(), "OpenAI chat failed: {:?}", e);
        RelayError::from(e)
    })?;

    let Some(ChatResult {
        text: Some(text),
        citations,
    }) = result
    else {
        return Err(RelayError::EmptyResponse);
    };
    Ok(Reply {
        text,
        citations: citations.into_iter().filter_map(|c| c.url).collect(),
    })
}
