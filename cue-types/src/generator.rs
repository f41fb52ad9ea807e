//! The generation contract shared by every backend.
//!
//! [`Generator`] uses return-position `impl Trait` and is not object-safe.
//! Front ends are generic over `G: Generator`; a binary that picks a backend
//! at runtime wraps the concrete backends in an enum.

use crate::error::GenerationError;
use std::future::Future;
use std::sync::Arc;

/// Something that turns a prompt into generated text.
///
/// Each call is independent: implementations keep no per-call state on
/// `self`, so concurrent calls never see each other's output.
pub trait Generator: Send + Sync {
    /// Generate text for `prompt`.
    ///
    /// Resolves to the full generated text once the backend has finished.
    /// Partial output is never returned on failure.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

impl<G: Generator> Generator for Arc<G> {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        G::generate(self, prompt)
    }
}
