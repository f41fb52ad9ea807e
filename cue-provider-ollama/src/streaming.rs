//! NDJSON streaming support for the Ollama Generate API.
//!
//! Ollama emits one JSON object per line rather than SSE events:
//! ```text
//! {"model":"gemma3:4b","response":"Hello","done":false}
//! {"model":"gemma3:4b","response":" world","done":false}
//! {"model":"gemma3:4b","response":"","done":true,"done_reason":"stop","eval_count":10}
//! ```
//!
//! Lines that are not valid UTF-8 or do not decode into a
//! [`GenerationChunk`] are logged and skipped; they never end the stream.
//! A transport error does end it.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-completion>

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use cue_types::{GenerationChunk, GenerationError};
use futures::{Stream, StreamExt};
use reqwest::Response;

use crate::error::map_reqwest_error;

/// Stream of decoded chunks from one generate call.
///
/// Yields `Err` at most once, as its last item.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerationChunk, GenerationError>> + Send>>;

/// Wrap an HTTP response body into a [`ChunkStream`].
pub(crate) fn stream_chunks(response: Response, timeout: Option<Duration>) -> ChunkStream {
    let byte_stream = response
        .bytes_stream()
        .map(move |chunk| chunk.map_err(|e| map_reqwest_error(e, timeout)));
    Box::pin(parse_ndjson_stream(byte_stream))
}

/// Parse a raw byte stream into decoded chunks.
///
/// Partial lines are buffered across byte chunks. The stream completes when
/// the underlying byte stream ends or yields an error.
pub(crate) fn parse_ndjson_stream(
    byte_stream: impl Stream<Item = Result<Bytes, GenerationError>> + Send + 'static,
) -> impl Stream<Item = Result<GenerationChunk, GenerationError>> + Send + 'static {
    async_stream::stream! {
        let mut bytes_stream = std::pin::pin!(byte_stream);
        let mut decoder = LineDecoder::new();

        while let Some(chunk_result) = bytes_stream.next().await {
            let bytes = match chunk_result {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(error = %e, lines = decoder.lines, "generate stream interrupted");
                    yield Err(e);
                    return;
                }
            };

            for chunk in decoder.push(&bytes) {
                yield Ok(chunk);
            }
        }

        // An unterminated last line still counts.
        if let Some(chunk) = decoder.finish() {
            yield Ok(chunk);
        }

        tracing::debug!(lines = decoder.lines, skipped = decoder.skipped, "generate stream ended");
    }
}

/// Concatenate the `response` fragment of every chunk, in order.
///
/// Reads until the stream ends; a `done: true` chunk does not stop it early.
/// On error the partial text is dropped and the error returned.
pub async fn collect_text(
    chunks: impl Stream<Item = Result<GenerationChunk, GenerationError>>,
) -> Result<String, GenerationError> {
    let mut chunks = std::pin::pin!(chunks);
    let mut text = String::new();

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if chunk.done {
            tracing::debug!(
                model = %chunk.model,
                done_reason = ?chunk.done_reason,
                eval_count = ?chunk.eval_count,
                "final chunk received"
            );
        }
        text.push_str(&chunk.response);
    }

    Ok(text)
}

/// Longest line the decoder will buffer. Anything longer is skipped.
const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Splits bytes into lines and decodes each one.
///
/// Works on bytes rather than `str` so a multi-byte character split across
/// two network reads is reassembled before UTF-8 validation.
struct LineDecoder {
    buf: Vec<u8>,
    /// Prefix of `buf` already known to hold no newline.
    scanned: usize,
    max_line: usize,
    /// Dropping the rest of an oversized line, up to its newline.
    discarding: bool,
    /// Non-blank lines seen.
    lines: usize,
    /// Lines dropped because they did not decode.
    skipped: usize,
}

impl LineDecoder {
    fn new() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }

    fn with_max_line(max_line: usize) -> Self {
        Self {
            buf: Vec::new(),
            scanned: 0,
            max_line,
            discarding: false,
            lines: 0,
            skipped: 0,
        }
    }

    /// Append bytes and decode every line they complete.
    fn push(&mut self, mut bytes: &[u8]) -> Vec<GenerationChunk> {
        if self.discarding {
            let Some(newline_pos) = bytes.iter().position(|b| *b == b'\n') else {
                return Vec::new();
            };
            self.discarding = false;
            bytes = &bytes[newline_pos + 1..];
        }
        self.buf.extend_from_slice(bytes);

        let buf = std::mem::take(&mut self.buf);
        let mut out = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = buf[from..].iter().position(|b| *b == b'\n') {
            let newline_pos = from + offset;
            if let Some(chunk) = self.decode_line(&buf[start..newline_pos]) {
                out.push(chunk);
            }
            start = newline_pos + 1;
            from = start;
        }
        self.buf = buf;
        self.buf.drain(..start);
        self.scanned = self.buf.len();

        if self.buf.len() > self.max_line {
            self.lines += 1;
            self.skipped += 1;
            tracing::warn!(
                buffered = self.buf.len(),
                limit = self.max_line,
                "skipping oversized NDJSON line"
            );
            self.buf = Vec::new();
            self.scanned = 0;
            self.discarding = true;
        }
        out
    }

    /// Decode whatever is left once the byte stream has ended.
    fn finish(&mut self) -> Option<GenerationChunk> {
        self.scanned = 0;
        self.discarding = false;
        let rest = std::mem::take(&mut self.buf);
        self.decode_line(&rest)
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<GenerationChunk> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

        let line = match std::str::from_utf8(raw) {
            Ok(s) => s.trim(),
            Err(e) => {
                self.lines += 1;
                self.skipped += 1;
                tracing::warn!(error = %e, "skipping NDJSON line that is not UTF-8");
                return None;
            }
        };
        if line.is_empty() {
            return None;
        }
        self.lines += 1;

        match GenerationChunk::from_line(line) {
            Ok(chunk) => Some(chunk),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(error = %e, line = %line, "skipping malformed NDJSON line");
                None
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
