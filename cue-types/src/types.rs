//! Ollama `/api/generate` request/response types.
//!
//! The endpoint streams its answer as newline-delimited JSON:
//! ```text
//! {"model":"gemma3:4b","created_at":"...","response":"Water","done":false}
//! {"model":"gemma3:4b","created_at":"...","response":" is","done":false}
//! {"model":"gemma3:4b","created_at":"...","response":"","done":true,"done_reason":"stop","eval_count":42}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of a `/api/generate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Model identifier (e.g. "gemma3:4b").
    pub model: String,
    /// User-supplied prompt text. May be empty.
    pub prompt: String,
}

impl GenerationRequest {
    /// Build a request for `model` with the given prompt.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

/// One decoded line of the response stream.
///
/// `response` is required. A line without it does not decode and is skipped
/// by the stream reader, so it contributes nothing to the result. Every other
/// field falls back to its default when absent or of an unexpected type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationChunk {
    /// Model that produced the chunk.
    #[serde(default, deserialize_with = "lenient")]
    pub model: String,
    /// Text fragment generated since the previous chunk.
    pub response: String,
    /// Set on the final chunk.
    #[serde(default, deserialize_with = "lenient")]
    pub done: bool,
    /// Why generation stopped (final chunk only, e.g. "stop" or "length").
    #[serde(default, deserialize_with = "lenient")]
    pub done_reason: Option<String>,
    /// Number of prompt tokens evaluated (final chunk only).
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_eval_count: Option<u64>,
    /// Number of tokens generated (final chunk only).
    #[serde(default, deserialize_with = "lenient")]
    pub eval_count: Option<u64>,
    /// Total wall time in nanoseconds (final chunk only).
    #[serde(default, deserialize_with = "lenient")]
    pub total_duration: Option<u64>,
}

impl GenerationChunk {
    /// Decode a single NDJSON line.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A prompt paired with the text generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    prompt: String,
    generated_text: String,
}

impl GenerationResult {
    /// Pair a prompt with its generated text.
    pub fn new(prompt: impl Into<String>, generated_text: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            generated_text: generated_text.into(),
        }
    }

    /// The prompt that was sent.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Concatenation of every fragment received, in arrival order.
    pub fn generated_text(&self) -> &str {
        &self.generated_text
    }
}
