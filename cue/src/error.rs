//! Top-level error for the `cue` binary.

use cue_types::GenerationError;
use thiserror::Error;

use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Anything that can stop the `cue` binary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CueError {
    /// Bad command-line flags.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A one-shot generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Copying failed.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),

    /// Reading stdin or writing stdout failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
