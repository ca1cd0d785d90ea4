//! OpenAI relay data models
//!
//! Conversation items, chat options and results passed across the
//! `OpenAIChat` boundary, plus the decoded `OPENAI_REQUEST` intent.

use crate::core::constants::{action, extra};
use crate::models::intent::Intent;
use serde::{Deserialize, Serialize};

/// One turn of the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageItem {
    pub role: String,
    pub content: String,
}

impl MessageItem {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Decode a JSON array of `{role, content}` objects
///
/// Unknown keys on each item are ignored.
pub fn decode_history(json: &str) -> Result<Vec<MessageItem>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Coarse location hint forwarded to web search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    #[serde(rename = "type", default = "default_location_type")]
    pub location_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_location_type() -> String {
    "approximate".to_string()
}

impl UserLocation {
    /// Build a location only when at least one hint is present
    pub fn from_hints(
        country: Option<String>,
        city: Option<String>,
        region: Option<String>,
        timezone: Option<String>,
    ) -> Option<Self> {
        if country.is_none() && city.is_none() && region.is_none() && timezone.is_none() {
            return None;
        }
        Some(Self {
            location_type: default_location_type(),
            country,
            city,
            region,
            timezone,
        })
    }
}

/// Options for a multi-turn chat call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOptions {
    pub enable_web_search: bool,
    /// `None` means no domain restriction; never `Some` of an empty list
    pub allowed_domains: Option<Vec<String>>,
    pub model: String,
    pub user_location: Option<UserLocation>,
}

/// A web source referenced by the model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCitation {
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl UrlCitation {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            title: None,
        }
    }
}

/// Result of a multi-turn chat call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResult {
    pub text: Option<String>,
    pub citations: Vec<UrlCitation>,
}

/// Decoded `OPENAI_REQUEST` intent
///
/// `history_json` stays encoded until the worker decodes it, so malformed
/// input surfaces as a relay error rather than being rejected on receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenAIRequest {
    pub history_json: Option<String>,
    pub enable_web: bool,
    pub allowed_domains: Option<Vec<String>>,
    pub model: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub request_id: Option<String>,
}

impl OpenAIRequest {
    /// Request carrying an already-structured history
    pub fn with_history(history: &[MessageItem]) -> Result<Self, serde_json::Error> {
        Ok(Self {
            history_json: Some(serde_json::to_string(history)?),
            ..Self::default()
        })
    }

    pub fn from_intent(intent: &Intent) -> Self {
        let string = |key: &str| intent.string_extra(key).map(str::to_string);
        Self {
            history_json: string(extra::HISTORY_JSON),
            enable_web: intent.bool_extra(extra::ENABLE_WEB, false),
            allowed_domains: intent
                .string_array_extra(extra::ALLOWED_DOMAINS)
                .map(<[String]>::to_vec),
            model: string(extra::MODEL),
            country: string(extra::COUNTRY),
            city: string(extra::CITY),
            region: string(extra::REGION),
            timezone: string(extra::TIMEZONE),
            request_id: string(extra::REQUEST_ID),
        }
    }

    pub fn into_intent(self) -> Intent {
        let mut intent =
            Intent::new(action::OPENAI_REQUEST).with_bool(extra::ENABLE_WEB, self.enable_web);
        intent.put_optional_string(extra::HISTORY_JSON, self.history_json);
        if let Some(domains) = self.allowed_domains {
            intent = intent.with_string_array(extra::ALLOWED_DOMAINS, domains);
        }
        intent.put_optional_string(extra::MODEL, self.model);
        intent.put_optional_string(extra::COUNTRY, self.country);
        intent.put_optional_string(extra::CITY, self.city);
        intent.put_optional_string(extra::REGION, self.region);
        intent.put_optional_string(extra::TIMEZONE, self.timezone);
        intent.put_optional_string(extra::REQUEST_ID, self.request_id);
        intent
    }

    /// Allow-list with empty entries removed; empty collapses to `None`
    pub fn domain_filter(&self) -> Option<Vec<String>> {
        let domains: Vec<String> = self
            .allowed_domains
            .as_deref()?
            .iter()
            .filter(|d| !d.is_empty())
            .cloned()
            .collect();
        (!domains.is_empty()).then_some(domains)
    }

    pub fn user_location(&self) -> Option<UserLocation> {
        UserLocation::from_hints(
            self.country.clone(),
            self.city.clone(),
            self.region.clone(),
            self.timezone.clone(),
        )
    }
}
