//! Test fixtures for common payloads.

use buzz_events::Payload;
use serde::{Deserialize, Serialize};

/// A small structured payload for tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    pub text: String,
}

impl Payload for Message {}

/// Create a message with the given text.
#[must_use]
pub fn message(text: impl Into<String>) -> Message {
    Message { text: text.into() }
}

/// Create the default test message.
#[must_use]
pub fn sample_message() -> Message {
    message("hello")
}

/// Create a JSON payload shaped like `{ "message": text }`.
#[must_use]
pub fn json_message(text: &str) -> serde_json::Value {
    serde_json::json!({ "message": text })
}
