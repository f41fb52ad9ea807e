//! Export sinks for generated text.

use std::future::Future;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::RwLock;

/// Errors from a [`ClipboardSink`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The clipboard command could not be started or fed.
    #[error("clipboard command failed: {0}")]
    Io(#[from] std::io::Error),

    /// The clipboard command ran but reported failure.
    #[error("clipboard command exited with {0}")]
    Exit(ExitStatus),
}

/// Somewhere to put a copy of generated text.
pub trait ClipboardSink: Send + Sync {
    /// Replace the sink's contents with `text`.
    fn copy(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send;
}

/// Keeps the last copied string in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: RwLock<Option<String>>,
}

impl MemoryClipboard {
    /// An empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last copied string, if any.
    pub async fn contents(&self) -> Option<String> {
        self.contents.read().await.clone()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn copy(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send {
        let text = text.to_string();
        async move {
            *self.contents.write().await = Some(text);
            Ok(())
        }
    }
}

/// Pipes text into an external command such as `pbcopy` or `wl-copy`.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// Run `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a command line on whitespace: `"xclip -selection clipboard"`.
    ///
    /// Returns `None` for a blank command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace();
        let program = words.next()?;
        Some(Self {
            program: program.to_string(),
            args: words.map(str::to_string).collect(),
        })
    }

    /// Program that receives the text on stdin.
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ClipboardSink for CommandClipboard {
    fn copy(&self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let text = text.as_bytes().to_vec();

        async move {
            let mut child = command.spawn()?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(&text).await?;
            }
            let status = child.wait().await?;
            if !status.success() {
                return Err(ClipboardError::Exit(status));
            }
            Ok(())
        }
    }
}
