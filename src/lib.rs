//! Porvida LLM request relay
//!
//! Two relays forward prompts to external chat services and broadcast the
//! results back as intents:
//!
//! - the Gemini relay answers `GEMINI_REQUEST` with a single-prompt chat
//! - the OpenAI relay answers `OPENAI_REQUEST` with a multi-turn chat,
//!   optionally with web search, and returns citation URLs
//!
//! The chat services themselves are supplied by the embedder through the
//! [`GeminiChat`] and [`OpenAIChat`] traits; [`serve`] runs both relays
//! behind the HTTP router on the configured address.

pub mod api;
pub mod core;
pub mod models;
pub mod relay;

pub use crate::api::serve;
pub use crate::core::bus::BroadcastBus;
pub use crate::core::config::Config;
pub use crate::core::error::{ErrorKind, RelayError};
pub use crate::core::logging::init_logging;
pub use crate::core::provider::{GeminiChat, OpenAIChat, ProviderError};
pub use crate::models::intent::Intent;
pub use crate::models::response::RelayResponse;
pub use crate::relay::{RelayClient, RelayService};
