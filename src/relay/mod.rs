//! Request relays
//!
//! A relay receives a request intent, runs one chat call on its own serial
//! executor and broadcasts exactly one response intent. `RelayService` wires
//! both relays to a shared bus; `RelayClient` adds correlated
//! request/reply on top of it.

pub mod client;
pub mod gemini;
pub mod openai;
pub mod service;

use crate::core::error::RelayError;
use crate::models::response::Reply;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

pub use crate::core::bus::Receiver;
pub use client::{ClientError, RelayClient};
pub use gemini::GeminiRelay;
pub use openai::OpenAIRelay;
pub use service::RelayService;

/// Run one answer, turning a panic inside the chat call into an upstream error
///
/// The relay still owes the caller a response when a collaborator panics.
pub(crate) async fn settle<F>(relay: &str, answer: F) -> Result<Reply, RelayError>
where
    F: Future<Output = Result<Reply, RelayError>>,
{
    match AssertUnwindSafe(answer).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(relay = relay, "Chat call panicked: {}", message);
            Err(RelayError::upstream(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "chat service panicked".to_string()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub chat services shared by relay tests

    use crate::core::provider::{GeminiChat, OpenAIChat, ProviderError};
    use crate::models::gemini::ChatResponse;
    use crate::models::openai::{ChatOptions, ChatResult, MessageItem};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    pub enum GeminiBehavior {
        Reply(ChatResponse),
        Fail(fn() -> ProviderError),
        /// Sleep for the given time, then echo the prompt
        SlowEcho(Duration),
        Panic(&'static str),
    }

    pub struct StubGemini {
        behavior: GeminiBehavior,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGemini {
        pub fn new(behavior: GeminiBehavior) -> Self {
            Self {
                behavior,
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeminiChat for StubGemini {
        async fn chat_simple(&self, prompt: &str) -> Result<ChatResponse, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.behavior {
                GeminiBehavior::Reply(response) => Ok(response.clone()),
                GeminiBehavior::Fail(make) => Err(make()),
                GeminiBehavior::SlowEcho(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(ChatResponse::text(prompt))
                }
                GeminiBehavior::Panic(message) => panic!("{}", message),
            }
        }
    }

    pub enum OpenAIBehavior {
        Reply(Option<ChatResult>),
        Fail(fn() -> ProviderError),
        /// Sleep for `delay / history length`, then echo the last message
        SlowEcho(Duration),
        Panic(&'static str),
    }

    pub struct StubOpenAI {
        behavior: OpenAIBehavior,
        pub calls: Mutex<Vec<(Vec<MessageItem>, ChatOptions)>>,
    }

    impl StubOpenAI {
        pub fn new(behavior: OpenAIBehavior) -> Self {
            Self {
                behavior,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<(Vec<MessageItem>, ChatOptions)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OpenAIChat for StubOpenAI {
        async fn chat(
            &self,
            history: &[MessageItem],
            options: &ChatOptions,
        ) -> Result<Option<ChatResult>, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push((history.to_vec(), options.clone()));
            match &self.behavior {
                OpenAIBehavior::Reply(result) => Ok(result.clone()),
                OpenAIBehavior::Fail(make) => Err(make()),
                OpenAIBehavior::SlowEcho(delay) => {
                    // Shorter conversations take longer
                    tokio::time::sleep(*delay / history.len().max(1) as u32).await;
                    Ok(Some(ChatResult {
                        text: history.last().map(|m| m.content.clone()),
                        citations: Vec::new(),
                    }))
                }
                OpenAIBehavior::Panic(message) => panic!("{}", message),
            }
        }
    }
}
