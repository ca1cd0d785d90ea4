//! Broadcast intent data model
//!
//! An intent is a named action plus a bag of typed extras. Requests and
//! responses for both relays travel as intents on the broadcast bus.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed value stored under an extra key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Extra {
    Bool(bool),
    String(String),
    StringArray(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Extra>,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: BTreeMap::new(),
        }
    }

    pub fn is(&self, action: &str) -> bool {
        self.action == action
    }

    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.put_string(key, value);
        self
    }

    pub fn with_bool(mut self, key: &str, value: bool) -> Self {
        self.extras.insert(key.to_string(), Extra::Bool(value));
        self
    }

    pub fn with_string_array(mut self, key: &str, values: Vec<String>) -> Self {
        self.extras
            .insert(key.to_string(), Extra::StringArray(values));
        self
    }

    pub fn put_string(&mut self, key: &str, value: impl Into<String>) {
        self.extras
            .insert(key.to_string(), Extra::String(value.into()));
    }

    /// Store the value only when present
    pub fn put_optional_string(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.put_string(key, value);
        }
    }

    pub fn has_extra(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    /// String extra, or `None` when missing or not a string
    pub fn string_extra(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(Extra::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean extra, or `default` when missing or not a boolean
    pub fn bool_extra(&self, key: &str, default: bool) -> bool {
        match self.extras.get(key) {
            Some(Extra::Bool(b)) => *b,
            _ => default,
        }
    }

    /// String array extra, or `None` when missing or not an array
    pub fn string_array_extra(&self, key: &str) -> Option<&[String]> {
        match self.extras.get(key) {
            Some(Extra::StringArray(values)) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_getters_ignore_mismatched_types() {
        let intent = Intent::new("ACTION")
            .with_string("name", "value")
            .with_bool("flag", true)
            .with_string_array("list", vec!["a".into(), "b".into()]);

        assert_eq!(intent.string_extra("name"), Some("value"));
        assert_eq!(intent.string_extra("flag"), None);
        assert!(intent.bool_extra("flag", false));
        assert!(!intent.bool_extra("name", false));
        assert!(intent.bool_extra("missing", true));
        assert_eq!(
            intent.string_array_extra("list"),
            Some(&["a".to_string(), "b".to_string()][..])
        );
        assert_eq!(intent.string_array_extra("name"), None);
    }

    #[test]
    fn test_deserialize_from_json() {
        let intent: Intent = serde_json::from_value(json!({
            "action": "com.porvida.OPENAI_REQUEST",
            "extras": {
                "history_json": "[]",
                "enable_web": true,
                "allowed_domains": ["example.com"]
            }
        }))
        .unwrap();

        assert!(intent.is("com.porvida.OPENAI_REQUEST"));
        assert_eq!(intent.string_extra("history_json"), Some("[]"));
        assert!(intent.bool_extra("enable_web", false));
        assert_eq!(intent.string_array_extra("allowed_domains").unwrap().len(), 1);
    }

    #[test]
    fn test_extras_are_optional_in_json() {
        let intent: Intent = serde_json::from_value(json!({ "action": "PING" })).unwrap();
        assert!(intent.extras.is_empty());
        assert_eq!(serde_json::to_value(&intent).unwrap(), json!({ "action": "PING" }));
    }
}
