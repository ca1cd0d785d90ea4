//! Constants for intent actions, extra keys and fixed relay messages
//!
//! Action names and extra keys form the wire contract with callers, so they
//! are kept in one place and referenced everywhere else.

/// Intent action constants
pub mod action {
    /// Inbound single-prompt request for the Gemini relay
    pub const GEMINI_REQUEST: &str = "com.porvida.GEMINI_REQUEST";

    /// Outbound response from the Gemini relay
    pub const GEMINI_RESPONSE: &str = "com.porvida.GEMINI_RESPONSE";

    /// Inbound multi-turn request for the OpenAI relay
    pub const OPENAI_REQUEST: &str = "com.porvida.OPENAI_REQUEST";

    /// Outbound response from the OpenAI relay
    pub const OPENAI_RESPONSE: &str = "com.porvida.OPENAI_RESPONSE";
}

/// Intent extra key constants
pub mod extra {
    /// Prompt text (Gemini request)
    pub const PROMPT: &str = "prompt";

    /// JSON array of `{role, content}` objects, string-encoded
    pub const HISTORY_JSON: &str = "history_json";

    /// Web search toggle
    pub const ENABLE_WEB: &str = "enable_web";

    /// String array of domains the web search may use
    pub const ALLOWED_DOMAINS: &str = "allowed_domains";

    /// Model name
    pub const MODEL: &str = "model";

    pub const COUNTRY: &str = "country";
    pub const CITY: &str = "city";
    pub const REGION: &str = "region";
    pub const TIMEZONE: &str = "timezone";

    /// Response text
    pub const TEXT: &str = "text";

    /// Response error message
    pub const ERROR: &str = "error";

    /// Response error category
    pub const ERROR_KIND: &str = "error_kind";

    /// String array of citation URLs
    pub const CITATIONS: &str = "citations";

    /// Correlation identifier, echoed from request to response
    pub const REQUEST_ID: &str = "request_id";
}

/// Message role constants
pub mod role {
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
}

/// Fixed error messages reported by the relays
pub mod message {
    pub const EMPTY_PROMPT: &str = "Empty prompt";
    pub const EMPTY_RESPONSE: &str = "Empty response";
}

/// Model used by the OpenAI relay when the request names none
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5-nano";
