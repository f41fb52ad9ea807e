//! Command-line configuration for the `cue` binary.
//!
//! There is no config file and no environment lookup: every setting has a
//! built-in default and can be overridden by a flag.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use cue_provider_ollama::Ollama;
use cue_provider_process::OllamaCli;
use cue_types::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use thiserror::Error;

use crate::backend::Backend;
use crate::clipboard::CommandClipboard;

/// Clipboard command used when none is given.
pub const DEFAULT_CLIPBOARD_COMMAND: &str = "pbcopy";

/// Errors from parsing command-line flags.
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A flag that takes a value was last on the line.
    #[error("missing value for {0}")]
    MissingValue(String),

    /// A flag this binary does not know.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// A flag value that does not parse.
    #[error("invalid value {value:?} for {flag}: {reason}")]
    InvalidValue {
        /// The flag.
        flag: String,
        /// What was passed.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Which [`Backend`] to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// HTTP `/api/generate`.
    #[default]
    Http,
    /// `ollama run` child process.
    Process,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(BackendKind::Http),
            "process" => Ok(BackendKind::Process),
            other => Err(format!("expected `http` or `process`, got `{other}`")),
        }
    }
}

/// Settings for one run of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueConfig {
    /// Ollama server base URL (HTTP backend).
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Backend to use.
    pub backend: BackendKind,
    /// Per-request timeout (HTTP backend). `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// `ollama` executable (process backend).
    pub ollama_program: PathBuf,
    /// Command line that receives copied text on stdin.
    pub clipboard_command: String,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            backend: BackendKind::default(),
            timeout: None,
            ollama_program: PathBuf::from("ollama"),
            clipboard_command: DEFAULT_CLIPBOARD_COMMAND.to_string(),
        }
    }
}

impl CueConfig {
    /// Build the configured generation backend.
    pub fn backend(&self) -> Backend {
        match self.backend {
            BackendKind::Http => {
                let mut client = Ollama::new()
                    .base_url(&self.base_url)
                    .model(&self.model);
                if let Some(timeout) = self.timeout {
                    client = client.timeout(timeout);
                }
                Backend::Http(client)
            }
            BackendKind::Process => Backend::Process(
                OllamaCli::new()
                    .program(&self.ollama_program)
                    .model(&self.model),
            ),
        }
    }

    /// Build the clipboard sink, `None` if the command line is blank.
    pub fn clipboard(&self) -> Option<CommandClipboard> {
        CommandClipboard::from_command_line(&self.clipboard_command)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit.
    Help,
    /// Run with `config`; one-shot when `prompt` is set, interactive otherwise.
    Run {
        /// Settings.
        config: CueConfig,
        /// Prompt given with `--prompt`.
        prompt: Option<String>,
    },
}

/// Parse flags (without the program name).
///
/// # Errors
///
/// Returns [`ConfigError`] for unknown flags, missing values or values that
/// do not parse.
pub fn parse_args<I>(args: I) -> Result<Invocation, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = CueConfig::default();
    let mut prompt = None;
    let mut remaining = args.into_iter();

    while let Some(flag) = remaining.next() {
        match flag.as_str() {
            "-h" | "--help" => return Ok(Invocation::Help),
            "--base-url" => config.base_url = take_arg(&flag, &mut remaining)?,
            "--model" => config.model = take_arg(&flag, &mut remaining)?,
            "--backend" => {
                let value = take_arg(&flag, &mut remaining)?;
                config.backend = value.parse().map_err(|reason| ConfigError::InvalidValue {
                    flag: flag.clone(),
                    value,
                    reason,
                })?;
            }
            "--timeout-secs" => {
                let value = take_arg(&flag, &mut remaining)?;
                let secs: f64 = value.parse().map_err(|e: std::num::ParseFloatError| {
                    ConfigError::InvalidValue {
                        flag: flag.clone(),
                        value: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
                let timeout = Duration::try_from_secs_f64(secs)
                    .ok()
                    .filter(|d| !d.is_zero())
                    .ok_or_else(|| ConfigError::InvalidValue {
                        flag: flag.clone(),
                        value: value.clone(),
                        reason: "expected a positive number of seconds".to_string(),
                    })?;
                config.timeout = Some(timeout);
            }
            "--ollama" => config.ollama_program = PathBuf::from(take_arg(&flag, &mut remaining)?),
            "--clipboard" => config.clipboard_command = take_arg(&flag, &mut remaining)?,
            "--prompt" => prompt = Some(take_arg(&flag, &mut remaining)?),
            other => return Err(ConfigError::UnknownFlag(other.to_string())),
        }
    }

    Ok(Invocation::Run { config, prompt })
}

fn take_arg(flag: &str, remaining: &mut impl Iterator<Item = String>) -> Result<String, ConfigError> {
    remaining
        .next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

/// One-line usage summary.
pub fn usage() -> &'static str {
    "cue [--base-url URL] [--model ID] [--backend http|process] [--timeout-secs N] \
     [--ollama PATH] [--clipboard CMD] [--prompt TEXT]"
}
