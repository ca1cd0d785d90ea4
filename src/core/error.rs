//! Typed relay errors
//!
//! Every failure a relay can report is one of four kinds. The kind travels
//! with the message in the response intent so callers can tell a bad request
//! from an upstream outage without parsing text.

use crate::core::constants::message;
use crate::core::provider::ProviderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse error category carried in the `error_kind` extra
///
/// `as_str` is the one name mapping; serde and `parse` both go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ErrorKind {
    /// Required input missing or empty; no external call was made
    Validation,
    /// External call returned nothing usable
    EmptyResult,
    /// Request payload could not be decoded
    Decode,
    /// External call failed
    Upstream,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::Validation,
        ErrorKind::EmptyResult,
        ErrorKind::Decode,
        ErrorKind::Upstream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::Decode => "decode",
            ErrorKind::Upstream => "upstream",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl From<ErrorKind> for &'static str {
    fn from(kind: ErrorKind) -> Self {
        kind.as_str()
    }
}

impl TryFrom<String> for ErrorKind {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        ErrorKind::parse(&name).ok_or_else(|| format!("unknown error kind: {}", name))
    }
}

/// Error produced while answering a relay request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("{}", message::EMPTY_PROMPT)]
    EmptyPrompt,

    #[error("{}", message::EMPTY_RESPONSE)]
    EmptyResponse,

    #[error("{0}")]
    Decode(String),

    #[error("{message}")]
    Upstream { message: String, retryable: bool },
}

impl RelayError {
    /// Upstream failure reported as a plain message, not a typed provider error
    pub fn upstream(message: impl Into<String>) -> Self {
        RelayError::Upstream {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RelayError::EmptyPrompt => ErrorKind::Validation,
            RelayError::EmptyResponse => ErrorKind::EmptyResult,
            RelayError::Decode(_) => ErrorKind::Decode,
            RelayError::Upstream { .. } => ErrorKind::Upstream,
        }
    }

    /// Whether resubmitting the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayError::Upstream { retryable: true, .. })
    }
}

impl From<ProviderError> for RelayError {
    fn from(err: ProviderError) -> Self {
        RelayError::Upstream {
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Decode(err.to_string())
    }
}
