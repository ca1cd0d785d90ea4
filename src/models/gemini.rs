//! Gemini relay data models

use crate::core::constants::{action, extra};
use crate::models::intent::Intent;
use serde::{Deserialize, Serialize};

/// Result of a single-prompt chat call
///
/// The service reports its own failures through `error` rather than by
/// returning `Err`, mirroring how the upstream wrapper behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: Option<String>,
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            text: None,
            error: Some(error.into()),
        }
    }
}

/// Decoded `GEMINI_REQUEST` intent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeminiRequest {
    pub prompt: Option<String>,
    pub request_id: Option<String>,
}

impl GeminiRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            request_id: None,
        }
    }

    pub fn from_intent(intent: &Intent) -> Self {
        Self {
            prompt: intent.string_extra(extra::PROMPT).map(str::to_string),
            request_id: intent.string_extra(extra::REQUEST_ID).map(str::to_string),
        }
    }

    pub fn into_intent(self) -> Intent {
        let mut intent = Intent::new(action::GEMINI_REQUEST);
        intent.put_optional_string(extra::PROMPT, self.prompt);
        intent.put_optional_string(extra::REQUEST_ID, self.request_id);
        intent
    }
}
