//! Incremental decoding of a chat-completion server-sent-event body.
//!
//! Bytes are buffered until a `\n` arrives, so multi-byte characters split
//! across network chunks decode intact. Each complete line is classified by
//! [`parse_line`]; only token and end-of-stream lines surface as events.

use futures_util::stream::{self, Stream, StreamExt};
use tracing::warn;

use crate::providers::CompletionChunk;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Incremental assistant text, in arrival order.
    Token(String),
    /// The `data: [DONE]` sentinel; nothing follows it.
    Done,
}

/// Classification of one logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Token(String),
    Done,
    /// Comments, blank keep-alives, non-data fields, chunks without text.
    Skip,
    /// A data line whose payload is not JSON.
    Malformed(String),
}

pub fn parse_line(line: &str) -> LineOutcome {
    let line = line.trim_end_matches('\r');
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return LineOutcome::Skip;
    };
    if payload == DONE_SENTINEL {
        return LineOutcome::Done;
    }
    match serde_json::from_str::<CompletionChunk>(payload) {
        Ok(chunk) => match chunk.token() {
            Some(t) => LineOutcome::Token(t.to_string()),
            None => LineOutcome::Skip,
        },
        Err(e) => LineOutcome::Malformed(e.to_string()),
    }
}

/// Byte buffer that yields complete `\n`-terminated lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line without its terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.buf.iter().position(|b| *b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=end).take(end).collect();
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Whatever is left after the last `\n`.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

struct DecodeState<S> {
    inner: S,
    lines: LineBuffer,
    eof: bool,
    finished: bool,
}

/// Turn a byte-chunk stream into [`SseEvent`]s.
///
/// Ends after `Done`, after the first transport error (yielded as `Err`), or
/// when the inner stream ends. A final unterminated line is still decoded.
/// Malformed data lines are logged and skipped.
pub fn decode_events<S, B, E>(inner: S) -> impl Stream<Item = Result<SseEvent, E>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let state = DecodeState { inner, lines: LineBuffer::new(), eof: false, finished: false };

    stream::unfold(state, |mut st| async move {
        loop {
            if st.finished {
                return None;
            }

            let line = match st.lines.next_line() {
                Some(line) => Some(line),
                None if st.eof => st.lines.take_remainder(),
                None => None,
            };

            if let Some(line) = line {
                match parse_line(&line) {
                    LineOutcome::Token(t) => return Some((Ok(SseEvent::Token(t)), st)),
                    LineOutcome::Done => {
                        st.finished = true;
                        return Some((Ok(SseEvent::Done), st));
                    }
                    LineOutcome::Skip => continue,
                    LineOutcome::Malformed(err) => {
                        warn!(line = %line, error = %err, "skipping malformed stream line");
                        continue;
                    }
                }
            }

            if st.eof {
                return None;
            }

            match st.inner.next().await {
                Some(Ok(chunk)) => st.lines.push(chunk.as_ref()),
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(e), st));
                }
                None => st.eof = true,
            }
        }
    })
}
