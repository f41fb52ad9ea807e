#![deny(missing_docs)]
//! # cue — prompt a local model, keep the answers
//!
//! Re-exports the generation backends and adds the pieces a front end needs:
//! a [`Session`] that tracks the in-flight generation and the result list,
//! clipboard sinks, and command-line configuration.
//!
//! ```no_run
//! use cue::prelude::*;
//!
//! # async fn demo() -> Result<(), cue::SessionError> {
//! let mut session = Session::new(Ollama::new());
//! session.submit("What is water made of?")?;
//! let id = session.finish().await?;
//! println!("{}", session.history().get(id).map(Entry::generated_text).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod history;
pub mod session;

pub use cue_provider_ollama;
pub use cue_provider_process;
pub use cue_types;

pub use backend::Backend;
pub use clipboard::{ClipboardError, ClipboardSink, CommandClipboard, MemoryClipboard};
pub use config::{BackendKind, ConfigError, CueConfig, Invocation, parse_args};
pub use error::CueError;
pub use history::{Entry, EntryId, History};
pub use session::{Session, SessionError};

/// Happy-path imports.
pub mod prelude {
    pub use crate::history::{Entry, EntryId, History};
    pub use crate::session::{Session, SessionError};
    pub use cue_provider_ollama::Ollama;
    pub use cue_provider_process::OllamaCli;
    pub use cue_types::{GenerationError, GenerationResult, Generator};
}
