//! Streaming token relay.
//!
//! The generate endpoint answers with newline-delimited JSON objects, each
//! carrying a `response` fragment and a `done` flag. Network chunks do not
//! line up with JSON lines, so bytes are buffered until a newline arrives.

use std::pin::pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;

/// One decoded line of a streaming generate response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateChunk {
    /// Next text fragment.
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
    /// Set when the server aborts the generation mid-stream.
    #[serde(default)]
    pub error: Option<String>,
}

/// Longest line the decoder will buffer while waiting for a newline.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// A stream line grew past [`MAX_LINE_BYTES`] without a newline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stream line exceeds {MAX_LINE_BYTES} bytes ({pending} buffered)")]
pub struct LineTooLong {
    pub pending: usize,
}

/// Incremental NDJSON decoder.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every chunk completed by them.
    ///
    /// Blank lines and lines that are not valid JSON are skipped. A trailing
    /// partial line stays buffered for the next call, up to
    /// [`MAX_LINE_BYTES`]; past that the buffer is dropped and an error
    /// returned.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<GenerateChunk>, LineTooLong> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(chunk) = parse_line(&self.buffer[start..end]) {
                chunks.push(chunk);
            }
            start = end + 1;
        }
        self.buffer.drain(..start);

        if self.buffer.len() > MAX_LINE_BYTES {
            let pending = self.buffer.len();
            self.buffer = Vec::new();
            return Err(LineTooLong { pending });
        }
        Ok(chunks)
    }

    /// Parse whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<GenerateChunk> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }

    /// Bytes waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(line: &[u8]) -> Option<GenerateChunk> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_slice(line) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            tracing::warn!(error = %e, len = line.len(), "Skipping malformed stream line");
            None
        }
    }
}

/// Returned by a token sink whose receiver has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("token receiver closed")]
pub struct SinkClosed;

/// Why a relay stopped early.
#[derive(Debug, thiserror::Error)]
pub enum RelayError<E: std::error::Error + 'static> {
    /// Reading the upstream body failed.
    #[error("inference stream failed: {0}")]
    Upstream(#[source] E),

    /// The server reported an error inside the stream.
    #[error("inference server error: {0}")]
    Model(String),

    /// The server sent a line longer than [`MAX_LINE_BYTES`].
    #[error(transparent)]
    LineTooLong(#[from] LineTooLong),

    /// The downstream consumer disconnected.
    #[error(transparent)]
    Sink(#[from] SinkClosed),
}

/// Outcome of a completed relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelaySummary {
    /// Tokens forwarded to the sink.
    pub tokens: usize,
    /// Whether the server sent `done: true`; `false` means the body simply
    /// ended.
    pub done: bool,
}

/// Forward every `response` fragment of `stream` to `sink`, appending it to
/// `accumulated` as well.
///
/// Stops at the first chunk with `done: true` or when the stream ends. On
/// error `accumulated` keeps whatever arrived before the failure.
pub async fn relay_tokens<S, E, F>(
    stream: S,
    mut sink: F,
    accumulated: &mut String,
) -> Result<RelaySummary, RelayError<E>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + 'static,
    F: FnMut(&str) -> Result<(), SinkClosed>,
{
    let mut stream = pin!(stream);
    let mut decoder = NdjsonDecoder::new();
    let mut summary = RelaySummary::default();

    while let Some(item) = stream.next().await {
        let bytes = item.map_err(RelayError::Upstream)?;
        for chunk in decoder.push(&bytes)? {
            if forward(chunk, &mut sink, accumulated, &mut summary)? {
                return Ok(summary);
            }
        }
    }

    if let Some(chunk) = decoder.finish() {
        forward(chunk, &mut sink, accumulated, &mut summary)?;
    }
    Ok(summary)
}

/// Handle one chunk. Returns `true` when the chunk ends the generation.
fn forward<E, F>(
    chunk: GenerateChunk,
    sink: &mut F,
    accumulated: &mut String,
    summary: &mut RelaySummary,
) -> Result<bool, RelayError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut(&str) -> Result<(), SinkClosed>,
{
    if let Some(message) = chunk.error {
        return Err(RelayError::Model(message));
    }
    if let Some(token) = chunk.response.as_deref().filter(|t| !t.is_empty()) {
        accumulated.push_str(token);
        sink(token)?;
        summary.tokens += 1;
    }
    if chunk.done {
        summary.done = true;
    }
    Ok(chunk.done)
}
