//! Relay data models
//!
//! Intents, the per-relay request types and the shared response type.

pub mod gemini;
pub mod intent;
pub mod openai;
pub mod response;
