//! Runtime choice between the HTTP client and the `ollama run` fallback.

use std::future::Future;

use cue_provider_ollama::Ollama;
use cue_provider_process::OllamaCli;
use cue_types::{GenerationError, Generator};

/// Either generation backend behind one [`Generator`] impl.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Streaming `/api/generate` over HTTP.
    Http(Ollama),
    /// `ollama run <model>` as a child process.
    Process(OllamaCli),
}

impl Generator for Backend {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        async move {
            match self {
                Backend::Http(client) => client.generate(prompt).await,
                Backend::Process(cli) => cli.generate(prompt).await,
            }
        }
    }
}

impl From<Ollama> for Backend {
    fn from(client: Ollama) -> Self {
        Backend::Http(client)
    }
}

impl From<OllamaCli> for Backend {
    fn from(cli: OllamaCli) -> Self {
        Backend::Process(cli)
    }
}
