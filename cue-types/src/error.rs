//! Errors surfaced by [`Generator`](crate::Generator) implementations.

use std::time::Duration;
use thiserror::Error;

/// Errors from a generation backend.
///
/// A line of the response stream that fails to decode is not an error: it is
/// skipped and logged by the backend, and never reaches the caller.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The configured base URL could not be turned into a request URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request body could not be serialized.
    #[error("could not encode request: {0}")]
    EncodingFailure(String),

    /// Connection refused, reset, or dropped mid-stream.
    #[error("transport failure: {0}")]
    TransportFailure(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The local `ollama` process exited unsuccessfully.
    #[error("process exited with {}: {output}", exit_label(.code))]
    ProcessFailed {
        /// Exit code, `None` when killed by a signal.
        code: Option<i32>,
        /// Captured stderr (or stdout when stderr was empty).
        output: String,
    },

    /// The caller cancelled the generation.
    #[error("generation cancelled")]
    Cancelled,

    /// The request did not finish within the configured timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

impl GenerationError {
    /// Message suitable for showing next to the prompt input.
    pub fn user_message(&self) -> String {
        format!("Error: {self}")
    }

    /// HTTP status of a [`GenerationError::ServerError`], if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            GenerationError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "signal".to_string(),
    }
}
