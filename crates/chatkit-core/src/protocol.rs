//! Wire protocol for the streaming chat endpoint.
//!
//! The server answers a turn submission with a line-oriented event stream:
//!
//! ```text
//! event: <message|chart|done|error>\n
//! data: <payload>\n
//! \n
//! ```
//!
//! The `event:` line is optional and defaults to `message`. Unlike full SSE,
//! every `data:` line is a complete frame on its own: it dispatches
//! immediately with the current event kind, and the kind resets to `message`
//! afterwards. Multi-line payloads are not assembled.

use std::str::FromStr;

/// Event kinds carried by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventKind {
    /// Incremental answer text (the default when no `event:` line precedes).
    #[default]
    Message,
    /// Structured chart payload (JSON).
    Chart,
    /// Terminal: the answer is complete.
    Done,
    /// Terminal: the server reported an application-level failure.
    Error,
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "chart" => Ok(EventKind::Chart),
            "done" => Ok(EventKind::Done),
            "error" => Ok(EventKind::Error),
            // "message" and anything unrecognized fall back to the default.
            _ => Ok(EventKind::Message),
        }
    }
}

/// One decoded protocol unit: an event kind plus its payload line.
///
/// Frames are handed to the caller by value and never retained by the
/// decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: EventKind,
    pub payload: String,
}

impl Frame {
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Returns true for frames that end the stream (`done`/`error`).
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Done | EventKind::Error)
    }
}

/// Incremental frame decoder over a raw byte stream.
///
/// Bytes are appended to a pending buffer; complete lines (LF or CRLF
/// terminated) are consumed as they become available and the unterminated
/// tail is deferred to the next push. Because only complete lines are
/// converted to text, multi-byte UTF-8 sequences split across reads are
/// reassembled before decoding. The decoded frame sequence is therefore
/// identical no matter how the bytes are chunked.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    kind: EventKind,
}

const EVENT_MARKER: &str = "event:";
const DATA_MARKER: &str = "data:";

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every frame completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
            line.pop(); // trailing \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.consume_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Handles one complete line; returns a frame for `data:` lines.
    fn consume_line(&mut self, line: &str) -> Option<Frame> {
        if let Some(value) = line.strip_prefix(EVENT_MARKER) {
            self.kind = value.trim().parse().unwrap_or_default();
            None
        } else if let Some(value) = line.strip_prefix(DATA_MARKER) {
            let payload = value.strip_prefix(' ').unwrap_or(value);
            // One data line = one frame; the kind resets afterwards.
            let kind = std::mem::take(&mut self.kind);
            Some(Frame::new(kind, payload))
        } else {
            // Blank separators and comment lines carry no frame.
            None
        }
    }
}
