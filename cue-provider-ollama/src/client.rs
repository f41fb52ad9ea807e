//! Ollama API client struct and builder.

use std::future::Future;
use std::time::Duration;

use cue_types::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, GENERATE_PATH, GenerationError, GenerationRequest, Generator,
};
use reqwest::Url;

use crate::error::{map_http_status, map_reqwest_error};
use crate::streaming::{ChunkStream, collect_text, stream_chunks};

/// Client for the Ollama Generate API.
///
/// Implements [`Generator`]. Construct one and pass it to whatever needs it;
/// the client holds no per-call state, so concurrent calls are independent.
///
/// # Example
///
/// ```no_run
/// use cue_provider_ollama::Ollama;
///
/// let client = Ollama::new()
///     .model("gemma3:4b")
///     .base_url("http://localhost:11434");
/// ```
#[derive(Debug, Clone)]
pub struct Ollama {
    /// Model identifier sent with every request.
    pub(crate) model: String,
    /// API base URL (override for testing or remote Ollama instances).
    pub(crate) base_url: String,
    /// Optional limit on the whole request, including reading the stream.
    pub(crate) timeout: Option<Duration>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl Ollama {
    /// Create a new client with sensible defaults.
    ///
    /// Default model: `gemma3:4b`.
    /// Default base URL: `http://localhost:11434`.
    /// No timeout: a server that stops responding blocks the call until it is
    /// dropped or cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL.
    ///
    /// Useful for testing with a local mock server or a remote Ollama instance.
    /// The URL is validated when a request is made, not here.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Fail a request that has not finished streaming within `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured [`reqwest::Client`] (proxies, TLS roots, pooling).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Model identifier sent with every request.
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Build the generate endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidEndpoint`] if the base URL does not
    /// parse or is not an `http`/`https` URL with a host.
    pub fn generate_url(&self) -> Result<Url, GenerationError> {
        let joined = format!("{}{GENERATE_PATH}", self.base_url.trim_end_matches('/'));
        let url = Url::parse(&joined)
            .map_err(|e| GenerationError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(GenerationError::InvalidEndpoint(format!(
                "{}: expected an http(s) URL with a host",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Build the request without touching the network.
    fn prepare(&self, prompt: &str) -> Result<reqwest::RequestBuilder, GenerationError> {
        let url = self.generate_url()?;
        let body = serde_json::to_vec(&GenerationRequest::new(&self.model, prompt))
            .map_err(|e| GenerationError::EncodingFailure(e.to_string()))?;

        tracing::debug!(url = %url, model = %self.model, "sending generate request to Ollama");

        let mut request = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request)
    }

    /// Send a generate request and return the decoded chunk stream.
    ///
    /// Resolves once the response headers have arrived with a 2xx status. The
    /// stream yields chunks as Ollama produces them, so a front end can render
    /// partial text before generation finishes.
    ///
    /// # Errors
    ///
    /// Fails before any I/O with [`GenerationError::InvalidEndpoint`] or
    /// [`GenerationError::EncodingFailure`]; otherwise with
    /// [`GenerationError::TransportFailure`], [`GenerationError::TimedOut`] or
    /// [`GenerationError::ServerError`].
    pub fn generate_stream(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ChunkStream, GenerationError>> + Send {
        let prepared = self.prepare(prompt);
        let timeout = self.timeout;

        async move {
            let response = prepared?
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, timeout))?;

            let status = response.status();
            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                tracing::debug!(status = status.as_u16(), "Ollama rejected generate request");
                return Err(map_http_status(status, &body_text));
            }

            Ok(stream_chunks(response, timeout))
        }
    }
}

impl Default for Ollama {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for Ollama {
    /// Send a generate request and accumulate the streamed fragments.
    ///
    /// Reads the NDJSON body to its end and returns the concatenation of every
    /// `response` fragment. Malformed lines are skipped; a transport error
    /// mid-stream fails the call and discards what was accumulated.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send {
        let pending = self.generate_stream(prompt);
        async move { collect_text(pending.await?).await }
    }
}
