#![deny(missing_docs)]
//! Generator backed by the `ollama` command-line tool.
//!
//! Spawns `ollama run <model>`, writes the prompt to its stdin and returns
//! whatever it prints. No HTTP server has to be reachable, only the binary.
//! The prompt is passed as data on stdin and never through a shell.

use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use cue_types::{DEFAULT_MODEL, GenerationError, Generator};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default executable, resolved through `PATH`.
const DEFAULT_PROGRAM: &str = "ollama";

/// Runs generations through a local `ollama` executable.
///
/// # Example
///
/// ```no_run
/// use cue_provider_process::OllamaCli;
///
/// // Ollama inside a container: `docker exec ollama ollama run gemma3:4b`
/// let cli = OllamaCli::new()
///     .program("docker")
///     .args(["exec", "-i", "ollama", "ollama"])
///     .model("gemma3:4b");
/// ```
#[derive(Debug, Clone)]
pub struct OllamaCli {
    program: PathBuf,
    args: Vec<OsString>,
    model: String,
}

impl OllamaCli {
    /// Use `ollama` from `PATH` with the default model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            args: Vec::new(),
            model: DEFAULT_MODEL.into(),
        }
    }

    /// Override the executable (e.g. `/usr/local/bin/ollama`).
    #[must_use]
    pub fn program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments placed before `run <model>`.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Default for OllamaCli {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for OllamaCli {
    /// Run `ollama run <model>` once with `prompt` on stdin.
    ///
    /// Dropping the returned future kills the child process.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        let mut command = self.command();
        let program = self.program.display().to_string();
        let model = self.model.clone();
        let mut input = prompt.as_bytes().to_vec();
        input.push(b'\n');

        async move {
            tracing::debug!(program = %program, model = %model, "spawning ollama process");

            let mut child = command
                .spawn()
                .map_err(|e| GenerationError::TransportFailure(Box::new(e)))?;

            // Stdin is fed while stdout and stderr are drained. A child may
            // start answering before it has read the whole prompt.
            let stdin = child.stdin.take();
            let feed = async move {
                let Some(mut stdin) = stdin else {
                    return Ok(());
                };
                match stdin.write_all(&input).await {
                    Ok(()) => Ok(()),
                    // The child exited without reading; its status says why.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        tracing::debug!("ollama process closed stdin early");
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            };

            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            let output = output.map_err(|e| GenerationError::TransportFailure(Box::new(e)))?;
            fed.map_err(|e| GenerationError::TransportFailure(Box::new(e)))?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let diagnostics = if stderr.is_empty() {
                    String::from_utf8_lossy(&output.stdout).trim().to_string()
                } else {
                    stderr
                };
                return Err(GenerationError::ProcessFailed {
                    code: output.status.code(),
                    output: diagnostics,
                });
            }

            let text = String::from_utf8_lossy(&output.stdout);
            Ok(text.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}
