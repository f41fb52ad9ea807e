#![deny(missing_docs)]
//! Shared types for cue.
//!
//! Defines the [`Generator`] contract every backend implements, the wire-level
//! data model for Ollama's `/api/generate` endpoint, and [`GenerationError`].

pub mod error;
pub mod generator;
pub mod types;

pub use error::GenerationError;
pub use generator::Generator;
pub use types::{GenerationChunk, GenerationRequest, GenerationResult};

/// Model used when a client is not told otherwise.
pub const DEFAULT_MODEL: &str = "gemma3:4b";

/// Base URL of a locally running Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Path of the text generation endpoint, relative to the base URL.
pub const GENERATE_PATH: &str = "/api/generate";
