#![deny(missing_docs)]
//! Streaming Ollama client for cue.
//!
//! Implements [`cue_types::Generator`] for Ollama's `/api/generate` endpoint.
//! The endpoint streams newline-delimited JSON; each line carries a text
//! fragment, and the fragments are concatenated in arrival order until the
//! body ends.

mod client;
mod error;
mod streaming;

pub use client::Ollama;
pub use streaming::{ChunkStream, collect_text};
