//! Presentation state for one prompt box and its result list.
//!
//! A [`Session`] is what a front end binds to: it holds the history, knows
//! whether a generation is in flight (input is disabled while it is), and
//! keeps the last error message. Generations run as spawned tokio tasks the
//! session owns, so the front end can cancel them.

use std::sync::Arc;

use cue_types::{GenerationError, GenerationResult, Generator};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clipboard::{ClipboardError, ClipboardSink};
use crate::history::{Entry, EntryId, History};

/// Errors from [`Session`] operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The prompt was empty or only whitespace.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// A generation is already running.
    #[error("a generation is already in progress")]
    Busy,

    /// There is no generation to wait for.
    #[error("no generation in progress")]
    Idle,

    /// The generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The generation task panicked.
    #[error("generation task failed: {0}")]
    TaskFailed(String),

    /// No history entry has this id.
    #[error("no entry with id {0}")]
    UnknownEntry(EntryId),

    /// Copying to the clipboard sink failed.
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

struct InFlight {
    prompt: String,
    cancel: CancellationToken,
    handle: JoinHandle<Result<String, GenerationError>>,
}

/// One prompt box, its in-flight generation and its result list.
pub struct Session<G> {
    generator: Arc<G>,
    history: History,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
}

impl<G: Generator + 'static> Session<G> {
    /// A session with an empty history.
    pub fn new(generator: G) -> Self {
        Self::with_shared(Arc::new(generator))
    }

    /// A session using a generator shared with other sessions.
    pub fn with_shared(generator: Arc<G>) -> Self {
        Self {
            generator,
            history: History::new(),
            in_flight: None,
            last_error: None,
        }
    }

    /// Whether `prompt` would be accepted right now (the "Generate" button state).
    pub fn can_submit(&self, prompt: &str) -> bool {
        !prompt.trim().is_empty() && self.in_flight.is_none()
    }

    /// Start generating text for `prompt` and return immediately.
    ///
    /// Clears the previous error. Call [`Session::finish`] to collect the
    /// outcome.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyPrompt`] for a blank prompt and
    /// [`SessionError::Busy`] while another generation is running.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, prompt: impl Into<String>) -> Result<(), SessionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if self.in_flight.is_some() {
            return Err(SessionError::Busy);
        }

        self.last_error = None;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let generator = Arc::clone(&self.generator);
        let task_prompt = prompt.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(GenerationError::Cancelled),
                result = generator.generate(&task_prompt) => result,
            }
        });

        tracing::debug!(prompt_len = prompt.len(), "generation submitted");
        self.in_flight = Some(InFlight {
            prompt,
            cancel,
            handle,
        });
        Ok(())
    }

    /// Whether a generation is in flight (input should be disabled).
    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Prompt of the in-flight generation, if any.
    pub fn pending_prompt(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|f| f.prompt.as_str())
    }

    /// Ask the in-flight generation to stop. It finishes with
    /// [`GenerationError::Cancelled`] unless it already completed.
    pub fn cancel(&self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.cancel.cancel();
        }
    }

    /// Wait for the in-flight generation and record its outcome.
    ///
    /// On success the result is inserted at the front of the history and its
    /// id returned. On failure the history is untouched and
    /// [`Session::last_error`] holds a message for the user. Either way the
    /// session accepts a new prompt afterwards; nothing is retried.
    ///
    /// Cancel-safe: dropping this future leaves the generation in flight.
    ///
    /// # Errors
    ///
    /// [`SessionError::Idle`] if nothing was submitted, otherwise the
    /// generation's error.
    pub async fn finish(&mut self) -> Result<EntryId, SessionError> {
        let in_flight = self.in_flight.as_mut().ok_or(SessionError::Idle)?;
        let joined = (&mut in_flight.handle).await;
        let prompt = self
            .in_flight
            .take()
            .map(|f| f.prompt)
            .unwrap_or_default();

        let outcome = match joined {
            Ok(result) => result.map_err(SessionError::from),
            Err(e) => Err(SessionError::TaskFailed(e.to_string())),
        };

        match outcome {
            Ok(text) => {
                tracing::debug!(text_len = text.len(), "generation finished");
                Ok(self.history.push_front(GenerationResult::new(prompt, text)))
            }
            Err(err) => {
                tracing::warn!(error = %err, "generation failed");
                self.last_error = Some(match &err {
                    SessionError::Generation(e) => e.user_message(),
                    other => format!("Error: {other}"),
                });
                Err(err)
            }
        }
    }

    /// Message for the most recent failure, cleared by the next submit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Finished generations, newest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Remove an entry from the history.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        self.history.remove(id)
    }

    /// Copy an entry's generated text into `sink`.
    ///
    /// # Errors
    ///
    /// [`SessionError::UnknownEntry`] or the sink's error.
    pub async fn copy<S: ClipboardSink>(&self, id: EntryId, sink: &S) -> Result<(), SessionError> {
        let entry = self.history.get(id).ok_or(SessionError::UnknownEntry(id))?;
        sink.copy(entry.generated_text()).await?;
        Ok(())
    }
}

impl<G> Drop for Session<G> {
    fn drop(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Echoes the prompt reversed, or fails for prompts starting with "fail".
    struct Reverse;

    impl Generator for Reverse {
        fn generate(
            &self,
            prompt: &str,
        ) -> impl Future<Output = Result<String, GenerationError>> + Send {
            let prompt = prompt.to_string();
            async move {
                if prompt.starts_with("fail") {
                    Err(GenerationError::ServerError {
                        status: 500,
                        body: "boom".into(),
                    })
                } else {
                    Ok(prompt.chars().rev().collect())
                }
            }
        }
    }

    /// Blocks until released, counting how many calls started.
    #[derive(Default)]
    struct Gate {
        release: Notify,
        started: AtomicUsize,
    }

    impl Generator for Gate {
        fn generate(
            &self,
            _prompt: &str,
        ) -> impl Future<Output = Result<String, GenerationError>> + Send {
            self.started.fetch_add(1, Ordering::SeqCst);
            async move {
                self.release.notified().await;
                Ok("released".to_string())
            }
        }
    }

    #[tokio::test]
    async fn success_prepends_result() {
        let mut session = Session::new(Reverse);
        session.submit("abc").unwrap();
        let first = session.finish().await.unwrap();
        session.submit("xyz").unwrap();
        session.finish().await.unwrap();

        let texts: Vec<_> = session.history().iter().map(Entry::generated_text).collect();
        assert_eq!(texts, ["zyx", "cba"]);
        assert_eq!(session.history().get(first).map(Entry::prompt), Some("abc"));
        assert!(session.last_error().is_none());
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn failure_sets_error_and_keeps_history() {
        let mut session = Session::new(Reverse);
        session.submit("ok").unwrap();
        session.finish().await.unwrap();

        session.submit("fail please").unwrap();
        let err = session.finish().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Generation(GenerationError::ServerError { status: 500, .. })
        ));
        assert_eq!(
            session.last_error(),
            Some("Error: server returned HTTP 500: boom")
        );
        assert_eq!(session.history().len(), 1);
        assert!(session.can_submit("again"), "input re-enabled after failure");
    }

    #[tokio::test]
    async fn next_submit_clears_error() {
        let mut session = Session::new(Reverse);
        session.submit("fail").unwrap();
        let _ = session.finish().await;
        assert!(session.last_error().is_some());

        session.submit("fine").unwrap();
        assert!(session.last_error().is_none());
        session.finish().await.unwrap();
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected() {
        let mut session = Session::new(Reverse);
        assert!(matches!(session.submit(""), Err(SessionError::EmptyPrompt)));
        assert!(matches!(session.submit("  \n"), Err(SessionError::EmptyPrompt)));
        assert!(!session.can_submit(""));
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn second_submit_while_busy_is_rejected() {
        let gate = Arc::new(Gate::default());
        let mut session = Session::with_shared(Arc::clone(&gate));

        session.submit("one").unwrap();
        assert!(session.is_generating());
        assert_eq!(session.pending_prompt(), Some("one"));
        assert!(!session.can_submit("two"));
        assert!(matches!(session.submit("two"), Err(SessionError::Busy)));

        gate.release.notify_one();
        session.finish().await.unwrap();
        assert_eq!(gate.started.load(Ordering::SeqCst), 1);
        assert!(session.can_submit("two"));
    }

    #[tokio::test]
    async fn finish_without_submit_is_idle() {
        let mut session = Session::new(Reverse);
        assert!(matches!(session.finish().await, Err(SessionError::Idle)));
    }

    #[tokio::test]
    async fn cancel_stops_in_flight_generation() {
        let mut session = Session::new(Gate::default());
        session.submit("never released").unwrap();
        session.cancel();

        let err = session.finish().await.unwrap_err();
        assert!(matches!(err, SessionError::Generation(GenerationError::Cancelled)));
        assert_eq!(session.last_error(), Some("Error: generation cancelled"));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn dropped_finish_keeps_generation_in_flight() {
        let gate = Arc::new(Gate::default());
        let mut session = Session::with_shared(Arc::clone(&gate));
        session.submit("p").unwrap();

        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), session.finish()).await;
        assert!(timed_out.is_err());
        assert!(session.is_generating());

        gate.release.notify_one();
        let id = session.finish().await.unwrap();
        assert_eq!(
            session.history().get(id).map(Entry::generated_text),
            Some("released")
        );
    }

    #[tokio::test]
    async fn remove_and_copy_entries() {
        let mut session = Session::new(Reverse);
        session.submit("olleh").unwrap();
        let id = session.finish().await.unwrap();

        let clipboard = MemoryClipboard::new();
        session.copy(id, &clipboard).await.unwrap();
        assert_eq!(clipboard.contents().await.as_deref(), Some("hello"));

        assert!(session.remove(id).is_some());
        assert!(matches!(
            session.copy(id, &clipboard).await,
            Err(SessionError::UnknownEntry(missing)) if missing == id
        ));
    }
}
