//! Correlated request/reply over the broadcast bus
//!
//! Plain broadcasts cannot tell concurrent callers apart. The client tags
//! each request with a fresh `request_id`, registers a waiter for the
//! response that echoes it and gives up after the reply timeout. Waiters are
//! registered receivers, so a burst of other traffic cannot push the reply
//! out from under them.

use crate::core::bus::{BroadcastBus, BusError, Receiver};
use crate::core::constants::{action, extra};
use crate::models::gemini::GeminiRequest;
use crate::models::intent::Intent;
use crate::models::openai::OpenAIRequest;
use crate::models::response::RelayResponse;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to publish request: {0}")]
    Publish(#[from] BusError),

    #[error("no response for request {request_id} within {timeout:?}")]
    Timeout {
        request_id: String,
        timeout: Duration,
    },

    #[error("reply channel closed before a response arrived")]
    Closed,
}

#[derive(Clone)]
pub struct RelayClient {
    bus: BroadcastBus,
    timeout: Duration,
}

impl RelayClient {
    pub fn new(bus: BroadcastBus, timeout: Duration) -> Self {
        Self { bus, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send a prompt to the Gemini relay and wait for its answer
    pub async fn ask_gemini(&self, prompt: impl Into<String>) -> Result<RelayResponse, ClientError> {
        let request_id = new_request_id();
        let request = GeminiRequest {
            prompt: Some(prompt.into()),
            request_id: Some(request_id.clone()),
        };
        self.round_trip(request.into_intent(), action::GEMINI_RESPONSE, request_id)
            .await
    }

    /// Send a conversation to the OpenAI relay and wait for its answer
    ///
    /// A `request_id` already set on the request is kept.
    pub async fn ask_openai(
        &self,
        mut request: OpenAIRequest,
    ) -> Result<RelayResponse, ClientError> {
        let request_id = request.request_id.get_or_insert_with(new_request_id).clone();
        self.round_trip(request.into_intent(), action::OPENAI_RESPONSE, request_id)
            .await
    }

    async fn round_trip(
        &self,
        request: Intent,
        response_action: &str,
        request_id: String,
    ) -> Result<RelayResponse, ClientError> {
        // Register first so a fast relay cannot answer before we listen
        let (sender, mut replies) = mpsc::unbounded_channel();
        let _registration = self.bus.register(Arc::new(ReplyWaiter {
            action: response_action.to_string(),
            request_id: request_id.clone(),
            sender,
        }));
        self.bus.send(request)?;
        debug!(request_id = %request_id, "Awaiting {}", response_action);

        match tokio::time::timeout(self.timeout, replies.recv()).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(ClientError::Closed),
            Err(_) => Err(ClientError::Timeout {
                request_id,
                timeout: self.timeout,
            }),
        }
    }
}

/// Forwards the one response matching a request
struct ReplyWaiter {
    action: String,
    request_id: String,
    sender: mpsc::UnboundedSender<RelayResponse>,
}

impl Receiver for ReplyWaiter {
    fn on_receive(&self, intent: &Intent) {
        if intent.is(&self.action)
            && intent.string_extra(extra::REQUEST_ID) == Some(self.request_id.as_str())
        {
            let _ = self.sender.send(RelayResponse::from_intent(intent));
        }
    }
}

fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
