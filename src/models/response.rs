//! Relay response model
//!
//! A response carries either text (with optional citations) or an error,
//! never both and never neither. The constructor enforces that, so a
//! response intent always tells the caller what happened.

use crate::core::constants::extra;
use crate::core::error::{ErrorKind, RelayError};
use crate::models::intent::Intent;
use serde::{Deserialize, Serialize};

/// Successful relay output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub citations: Vec<String>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}

impl RelayResponse {
    pub fn from_result(
        action: &str,
        request_id: Option<String>,
        result: Result<Reply, RelayError>,
    ) -> Self {
        let mut response = Self {
            action: action.to_string(),
            request_id,
            text: None,
            error: None,
            error_kind: None,
            citations: Vec::new(),
        };
        match result {
            Ok(reply) => {
                response.text = Some(reply.text);
                response.citations = reply.citations;
            }
            Err(err) => {
                response.error_kind = Some(err.kind());
                response.error = Some(err.to_string());
            }
        }
        response
    }

    /// Read a response back from a broadcast intent
    pub fn from_intent(intent: &Intent) -> Self {
        Self {
            action: intent.action.clone(),
            request_id: intent.string_extra(extra::REQUEST_ID).map(str::to_string),
            text: intent.string_extra(extra::TEXT).map(str::to_string),
            error: intent.string_extra(extra::ERROR).map(str::to_string),
            error_kind: intent
                .string_extra(extra::ERROR_KIND)
                .and_then(ErrorKind::parse),
            citations: intent
                .string_array_extra(extra::CITATIONS)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }

    pub fn into_intent(self) -> Intent {
        let mut intent = Intent::new(self.action);
        intent.put_optional_string(extra::ERROR, self.error);
        intent.put_optional_string(
            extra::ERROR_KIND,
            self.error_kind.map(|k| k.as_str().to_string()),
        );
        intent.put_optional_string(extra::TEXT, self.text);
        if !self.citations.is_empty() {
            intent = intent.with_string_array(extra::CITATIONS, self.citations);
        }
        intent.put_optional_string(extra::REQUEST_ID, self.request_id);
        intent
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
