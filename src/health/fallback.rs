//! Caller-facing payloads for degraded dependencies.

use std::collections::HashMap;

use serde::Serialize;

const GENERIC_MESSAGE: &str = "This service is temporarily unavailable. Please try again later.";

/// Built-in messages for the dependencies a chat deployment usually wraps.
const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    (
        "openai",
        "The AI assistant is temporarily unavailable. Please try again in a moment.",
    ),
    (
        "anthropic",
        "The AI assistant is temporarily unavailable. Please try again in a moment.",
    ),
    (
        "database",
        "We're having trouble reaching our database. Your data is safe; please retry shortly.",
    ),
    (
        "redis",
        "Caching is temporarily degraded. Responses may be slower than usual.",
    ),
    ("weather", "Weather data is temporarily unavailable."),
    (
        "search",
        "Search is temporarily unavailable. Please try again later.",
    ),
];

/// Payload returned to end users instead of an error page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FallbackResponse {
    pub error: String,
    pub service: String,
    pub fallback: bool,
    /// Seconds until the circuit may probe again.
    pub retry_after: u64,
}

/// Per-dependency message table: configured messages over built-in ones.
#[derive(Debug, Clone)]
pub struct FallbackMessages {
    messages: HashMap<String, String>,
}

impl Default for FallbackMessages {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl FallbackMessages {
    /// Built-in messages, overridden by `configured`.
    pub fn with_overrides(configured: &HashMap<String, String>) -> Self {
        let mut table = Self::default();
        table
            .messages
            .extend(configured.iter().map(|(k, v)| (k.clone(), v.clone())));
        table
    }

    pub fn message_for(&self, service: &str) -> &str {
        self.messages
            .get(service)
            .map(String::as_str)
            .unwrap_or(GENERIC_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lookup_order() {
        let mut configured = HashMap::new();
        configured.insert("openai".to_string(), "Custom".to_string());
        let table = FallbackMessages::with_overrides(&configured);

        assert_eq!(table.message_for("openai"), "Custom");
        assert!(table.message_for("redis").contains("Caching"));
        assert_eq!(table.message_for("unknown"), GENERIC_MESSAGE);
    }
}
