//! Streaming transport client.
//!
//! Opens one long-lived streaming request per call, decodes the byte stream
//! into [`Frame`]s incrementally, and dispatches them through an explicit
//! [`StreamHandlers`] parameter. At most one stream is in flight per
//! transport instance: starting a new call supersedes (cancels) the
//! previous one. Connectivity failures are retried with exponential
//! backoff; non-success status codes and application-level `error` frames
//! are terminal.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::charts::ChartPayload;
use crate::protocol::{EventKind, Frame, FrameDecoder};

/// Categories of transport failures for consistent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Failed to establish the connection or read from it.
    Connectivity,
    /// The server answered with a non-success status code.
    HttpStatus,
    /// The server reported a failure through an `error` frame.
    Server,
}

/// Structured transport failure with kind, optional status, and details.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// HTTP status code, present for `HttpStatus` errors.
    pub status: Option<u16>,
    /// One-line summary suitable for display.
    pub message: String,
    /// Optional additional details (e.g. raw error body).
    pub details: Option<String>,
}

impl TransportError {
    /// Creates a connectivity error.
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Connectivity,
            status: None,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, extracting a cleaner message from a
    /// JSON error body when one is present.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = extract_error_detail(body)
            .map_or_else(|| format!("HTTP {status}"), |msg| format!("HTTP {status}: {msg}"));
        Self {
            kind: TransportErrorKind::HttpStatus,
            status: Some(status),
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a server error from an `error` frame payload.
    pub fn server(payload: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Server,
            status: None,
            message: payload.into(),
            details: None,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Pulls a human-readable message out of a JSON error body.
///
/// Recognizes `{"detail": "..."}` (FastAPI style) and
/// `{"error": {"message": "..."}}`.
fn extract_error_detail(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    if let Some(detail) = json.get("detail").and_then(Value::as_str) {
        return Some(detail.to_string());
    }
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// Callbacks invoked as frames are decoded.
///
/// Passed explicitly into every streaming call; the transport keeps no
/// listener registry and no state between calls beyond the abort flag.
pub trait StreamHandlers {
    /// The request is about to be replayed after a connectivity failure.
    /// Frames already delivered by the failed attempt arrive again in full,
    /// so accumulated partial output must be discarded here.
    fn on_retry(&mut self);
    /// A `message` frame: verbatim incremental answer text.
    fn on_message(&mut self, text: &str);
    /// A validated `chart` frame.
    fn on_chart(&mut self, chart: ChartPayload);
    /// Terminal `done` frame.
    fn on_done(&mut self);
    /// Terminal failure: status error, server `error` frame, or exhausted
    /// connectivity retries.
    fn on_error(&mut self, error: TransportError);
}

/// Parameters for a single streaming call.
#[derive(Debug, Clone, Copy)]
pub struct StreamRequest<'a, T: Serialize> {
    pub endpoint: &'a str,
    pub body: &'a T,
    pub credential: &'a str,
    /// Additional connection attempts after a connectivity failure.
    pub max_retries: u32,
}

/// HTTP streaming transport.
pub struct StreamTransport {
    http: reqwest::Client,
    active: Mutex<CancellationToken>,
}

impl Default for StreamTransport {
    fn default() -> Self {
        Self::new()
    }
}

enum Attempt {
    /// The stream ran to a terminal outcome (handlers already invoked).
    Finished,
    /// Cancellation was observed; no further handlers may run.
    Cancelled,
    /// Connect or read failure; eligible for retry.
    Connectivity(TransportError),
}

impl StreamTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            active: Mutex::new(CancellationToken::new()),
        }
    }

    /// Requests cancellation of the in-flight stream, if any.
    ///
    /// The stream observes the flag at its next read or backoff wait and
    /// returns without invoking further handlers. Cancellation itself never
    /// produces `on_error`.
    pub fn cancel(&self) {
        self.lock_active().cancel();
    }

    /// Opens a streaming call and dispatches decoded frames to `handlers`
    /// until a terminal event, exhausted retries, or cancellation.
    ///
    /// Any stream still running under this instance is cancelled first.
    pub async fn stream<T: Serialize>(
        &self,
        request: StreamRequest<'_, T>,
        handlers: &mut (dyn StreamHandlers + Send),
    ) {
        let token = self.begin();
        let mut attempt: u32 = 0;

        loop {
            if token.is_cancelled() {
                return;
            }
            match self.attempt_stream(&request, &token, handlers).await {
                Attempt::Finished | Attempt::Cancelled => return,
                Attempt::Connectivity(err) => {
                    if attempt >= request.max_retries {
                        handlers.on_error(TransportError::connectivity(format!(
                            "Unable to reach the chat service after {} attempts: {}",
                            attempt + 1,
                            err.message
                        )));
                        return;
                    }
                    let delay = Duration::from_secs(1 << attempt);
                    attempt += 1;
                    warn!(
                        "stream attempt failed ({}); retrying in {}s (attempt {attempt}/{})",
                        err.message,
                        delay.as_secs(),
                        request.max_retries
                    );
                    tokio::select! {
                        () = token.cancelled() => return,
                        () = tokio::time::sleep(delay) => {}
                    }
                    // The new attempt re-reads the stream from the start.
                    handlers.on_retry();
                }
            }
        }
    }

    /// One connection attempt: send, check status, decode until terminal.
    async fn attempt_stream<T: Serialize>(
        &self,
        request: &StreamRequest<'_, T>,
        token: &CancellationToken,
        handlers: &mut (dyn StreamHandlers + Send),
    ) -> Attempt {
        let send = self
            .http
            .post(request.endpoint)
            .bearer_auth(request.credential)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(request.body)
            .send();

        let response = tokio::select! {
            () = token.cancelled() => return Attempt::Cancelled,
            response = send => match response {
                Ok(response) => response,
                Err(err) => {
                    return Attempt::Connectivity(TransportError::connectivity(format!(
                        "Connection failed: {err}"
                    )));
                }
            },
        };

        let status = response.status();
        if !status.is_success() {
            // Non-success responses are terminal, never retried.
            let body = response.text().await.unwrap_or_default();
            handlers.on_error(TransportError::http_status(status.as_u16(), &body));
            return Attempt::Finished;
        }

        let mut bytes = response.bytes_stream();
        read_frames(&mut bytes, token, handlers).await
    }

    /// Supersedes any prior stream and installs a fresh abort flag.
    fn begin(&self) -> CancellationToken {
        let mut guard = self.lock_active();
        guard.cancel();
        let fresh = CancellationToken::new();
        *guard = fresh.clone();
        fresh
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, CancellationToken> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reads a chunk stream to a terminal outcome, decoding and dispatching
/// frames as bytes arrive.
async fn read_frames<S, E>(
    stream: &mut S,
    token: &CancellationToken,
    handlers: &mut (dyn StreamHandlers + Send),
) -> Attempt
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: fmt::Display,
{
    let mut decoder = FrameDecoder::new();
    loop {
        let chunk = tokio::select! {
            () = token.cancelled() => return Attempt::Cancelled,
            chunk = stream.next() => chunk,
        };
        match chunk {
            // Clean end of stream without a terminal frame: stop quietly.
            // Retrying here would re-submit the turn and duplicate the
            // answer; only read *errors* are retried.
            None => return Attempt::Finished,
            Some(Err(err)) => {
                return Attempt::Connectivity(TransportError::connectivity(format!(
                    "Read failed: {err}"
                )));
            }
            Some(Ok(chunk)) => {
                for frame in decoder.push(&chunk) {
                    // A superseding call may have cancelled us between the
                    // read and this dispatch.
                    if token.is_cancelled() {
                        return Attempt::Cancelled;
                    }
                    if dispatch_frame(frame, handlers) {
                        // Terminal frame: stop reading, drop the rest.
                        return Attempt::Finished;
                    }
                }
            }
        }
    }
}

/// Dispatches one frame; returns true if the stream must stop.
fn dispatch_frame(frame: Frame, handlers: &mut (dyn StreamHandlers + Send)) -> bool {
    match frame.kind {
        EventKind::Message => {
            handlers.on_message(&frame.payload);
            false
        }
        EventKind::Chart => {
            // Malformed chart data must not abort the stream.
            if let Some(chart) = ChartPayload::parse(&frame.payload) {
                handlers.on_chart(chart);
            } else {
                debug!("chart frame dropped ({} bytes)", frame.payload.len());
            }
            false
        }
        EventKind::Done => {
            handlers.on_done();
            true
        }
        EventKind::Error => {
            handlers.on_error(TransportError::server(frame.payload));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Recorded handler invocations, comparable in tests.
    #[derive(Debug, Clone, PartialEq)]
    enum Recorded {
        Retry,
        Message(String),
        Chart(String),
        Done,
        Error(TransportErrorKind, Option<u16>),
    }

    #[derive(Default)]
    struct Recording {
        events: Arc<Mutex<Vec<Recorded>>>,
    }

    impl Recording {
        fn events(&self) -> Vec<Recorded> {
            self.events.lock().unwrap().clone()
        }

        fn shared(&self) -> RecordingHandlers {
            RecordingHandlers {
                events: Arc::clone(&self.events),
            }
        }
    }

    struct RecordingHandlers {
        events: Arc<Mutex<Vec<Recorded>>>,
    }

    impl StreamHandlers for RecordingHandlers {
        fn on_retry(&mut self) {
            self.events.lock().unwrap().push(Recorded::Retry);
        }

        fn on_message(&mut self, text: &str) {
            self.events
                .lock()
                .unwrap()
                .push(Recorded::Message(text.to_string()));
        }

        fn on_chart(&mut self, chart: ChartPayload) {
            self.events
                .lock()
                .unwrap()
                .push(Recorded::Chart(chart.title));
        }

        fn on_done(&mut self) {
            self.events.lock().unwrap().push(Recorded::Done);
        }

        fn on_error(&mut self, error: TransportError) {
            self.events
                .lock()
                .unwrap()
                .push(Recorded::Error(error.kind, error.status));
        }
    }

    fn sse_body(frames: &str) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/event-stream")
            .set_body_raw(frames.as_bytes().to_vec(), "text/event-stream")
    }

    fn turn_body() -> serde_json::Value {
        json!({"message": "hi", "context_type": "badminton"})
    }

    async fn run_stream(endpoint: &str, max_retries: u32) -> Vec<Recorded> {
        let recording = Recording::default();
        let mut handlers = recording.shared();
        let transport = StreamTransport::new();
        let body = turn_body();
        transport
            .stream(
                StreamRequest {
                    endpoint,
                    body: &body,
                    credential: "test-token",
                    max_retries,
                },
                &mut handlers,
            )
            .await;
        recording.events()
    }

    #[tokio::test]
    async fn test_dispatches_messages_charts_and_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: Hello\n\n",
            "data: , world\n\n",
            "event: chart\n",
            "data: {\"kind\":\"bar\",\"title\":\"Wins\",\"series\":[{\"label\":\"W\",\"values\":[1]}],\"categories\":[\"a\"]}\n\n",
            "event: done\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/stream"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(sse_body(body))
            .expect(1)
            .mount(&server)
            .await;

        let events = run_stream(&format!("{}/chat/stream", server.uri()), 3).await;
        assert_eq!(
            events,
            vec![
                Recorded::Message("Hello".to_string()),
                Recorded::Message(", world".to_string()),
                Recorded::Chart("Wins".to_string()),
                Recorded::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_chart_is_dropped_without_breaking_the_stream() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: chart\n",
            "data: {broken json\n\n",
            "data: still fine\n\n",
            "event: done\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(sse_body(body))
            .mount(&server)
            .await;

        let events = run_stream(&format!("{}/chat/stream", server.uri()), 3).await;
        assert_eq!(
            events,
            vec![Recorded::Message("still fine".to_string()), Recorded::Done]
        );
    }

    #[tokio::test]
    async fn test_nothing_is_dispatched_after_a_terminal_frame() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: done\n",
            "data: [DONE]\n\n",
            "data: late text\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(sse_body(body))
            .mount(&server)
            .await;

        let events = run_stream(&format!("{}/chat/stream", server.uri()), 3).await;
        assert_eq!(events, vec![Recorded::Done]);
    }

    #[tokio::test]
    async fn test_error_frame_is_terminal_and_reported_once() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: partial\n\n",
            "event: error\n",
            "data: model backend unavailable\n\n",
            "data: ignored\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(sse_body(body))
            .mount(&server)
            .await;

        let events = run_stream(&format!("{}/chat/stream", server.uri()), 3).await;
        assert_eq!(
            events,
            vec![
                Recorded::Message("partial".to_string()),
                Recorded::Error(TransportErrorKind::Server, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_terminal_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_raw(
                    r#"{"detail":"token expired"}"#.as_bytes().to_vec(),
                    "application/json",
                ),
            )
            .expect(1)
            .mount(&server)
            .await;

        let events = run_stream(&format!("{}/chat/stream", server.uri()), 3).await;
        assert_eq!(
            events,
            vec![Recorded::Error(TransportErrorKind::HttpStatus, Some(401))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_three_times_with_exponential_backoff() {
        // A listener that accepts and immediately closes every connection,
        // producing a transport-level failure on each attempt.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().unwrap();
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_counter = Arc::clone(&attempts);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                attempts_counter.fetch_add(1, Ordering::SeqCst);
                drop(socket);
            }
        });

        let started = tokio::time::Instant::now();
        let events = run_stream(&format!("http://{addr}/chat/stream"), 3).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 4, "1 initial + 3 retries");
        assert_eq!(
            events,
            vec![
                Recorded::Retry,
                Recorded::Retry,
                Recorded::Retry,
                Recorded::Error(TransportErrorKind::Connectivity, None),
            ]
        );
        // Paused clock: backoff waits of 1s + 2s + 4s dominate the elapsed
        // virtual time.
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_secs(7),
            "expected >= 7s of virtual backoff, got {elapsed:?}"
        );
    }

    /// Answers one HTTP request, advertising `full.len()` bytes of body but
    /// sending only `sent` before closing the connection.
    async fn serve_once(listener: &tokio::net::TcpListener, full: &str, sent: &str) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request_complete(&request) {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\ncontent-length: {}\r\n\r\n",
            full.len()
        );
        socket.write_all(head.as_bytes()).await.expect("write head");
        socket.write_all(sent.as_bytes()).await.expect("write body");
        socket.flush().await.expect("flush");
    }

    fn request_complete(request: &[u8]) -> bool {
        let Some(split) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&request[..split]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() - (split + 4) >= length
    }

    #[tokio::test(start_paused = true)]
    async fn test_mid_stream_read_failure_signals_a_reset_before_replaying() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().unwrap();
        let full = "data: Hello\n\ndata:  world\n\nevent: done\ndata: [DONE]\n\n";
        tokio::spawn(async move {
            // First connection dies after the opening frame; the second
            // serves the complete stream.
            serve_once(&listener, full, "data: Hello\n\n").await;
            serve_once(&listener, full, full).await;
        });

        let events = run_stream(&format!("http://{addr}/chat/stream"), 3).await;
        assert_eq!(
            events,
            vec![
                Recorded::Message("Hello".to_string()),
                Recorded::Retry,
                Recorded::Message("Hello".to_string()),
                Recorded::Message(" world".to_string()),
                Recorded::Done,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_any_bytes_invokes_no_handlers_and_no_retries() {
        // Accept the connection but never write a response.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let accepted_counter = Arc::clone(&accepted);
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                accepted_counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let recording = Recording::default();
        let mut handlers = recording.shared();
        let transport = Arc::new(StreamTransport::new());
        let body = turn_body();

        let endpoint = format!("http://{addr}/chat/stream");
        let streamer = Arc::clone(&transport);
        let task = tokio::spawn(async move {
            streamer
                .stream(
                    StreamRequest {
                        endpoint: &endpoint,
                        body: &body,
                        credential: "test-token",
                        max_retries: 3,
                    },
                    &mut handlers,
                )
                .await;
        });

        // Let the request go out, then cancel before any bytes arrive.
        tokio::time::sleep(Duration::from_millis(50)).await;
        transport.cancel();
        task.await.expect("stream task");

        assert!(recording.events().is_empty(), "no handlers on cancellation");
        assert!(accepted.load(Ordering::SeqCst) <= 1, "no retry after cancel");
    }

    #[tokio::test]
    async fn test_starting_a_new_stream_supersedes_the_previous_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(sse_body("event: done\ndata: [DONE]\n\n"))
            .mount(&server)
            .await;

        let transport = Arc::new(StreamTransport::new());
        let body = turn_body();

        // First stream parked on a silent listener.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let first = Recording::default();
        let mut first_handlers = first.shared();
        let first_transport = Arc::clone(&transport);
        let stale_endpoint = format!("http://{addr}/chat/stream");
        let stale_body = turn_body();
        let stale = tokio::spawn(async move {
            first_transport
                .stream(
                    StreamRequest {
                        endpoint: &stale_endpoint,
                        body: &stale_body,
                        credential: "t",
                        max_retries: 0,
                    },
                    &mut first_handlers,
                )
                .await;
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Second stream cancels the first and completes normally.
        let second = Recording::default();
        let mut second_handlers = second.shared();
        transport
            .stream(
                StreamRequest {
                    endpoint: &format!("{}/chat/stream", server.uri()),
                    body: &body,
                    credential: "t",
                    max_retries: 0,
                },
                &mut second_handlers,
            )
            .await;
        stale.await.expect("superseded stream task");

        assert!(first.events().is_empty());
        assert_eq!(second.events(), vec![Recorded::Done]);
    }

    #[tokio::test]
    async fn test_frames_decode_from_an_in_memory_chunk_stream() {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: He")),
            Ok(Bytes::from_static(b"llo\n\nevent: done\ndata: [DONE]\n\n")),
        ];
        let mut stream = futures_util::stream::iter(chunks);
        let token = CancellationToken::new();
        let recording = Recording::default();
        let mut handlers = recording.shared();

        let attempt = read_frames(&mut stream, &token, &mut handlers).await;

        assert!(matches!(attempt, Attempt::Finished));
        assert_eq!(
            recording.events(),
            vec![Recorded::Message("Hello".to_string()), Recorded::Done]
        );
    }

    #[tokio::test]
    async fn test_read_failure_mid_stream_is_reported_as_connectivity() {
        let chunks: Vec<std::result::Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: partial\n\n")),
            Err(std::io::Error::other("connection reset")),
        ];
        let mut stream = futures_util::stream::iter(chunks);
        let token = CancellationToken::new();
        let recording = Recording::default();
        let mut handlers = recording.shared();

        let attempt = read_frames(&mut stream, &token, &mut handlers).await;

        let Attempt::Connectivity(err) = attempt else {
            panic!("expected connectivity outcome");
        };
        assert_eq!(err.kind, TransportErrorKind::Connectivity);
        assert_eq!(
            recording.events(),
            vec![Recorded::Message("partial".to_string())]
        );
    }

    #[test]
    fn test_http_status_error_extracts_fastapi_detail() {
        let err = TransportError::http_status(503, r#"{"detail":"overloaded"}"#);
        assert_eq!(err.message, "HTTP 503: overloaded");
        assert_eq!(err.status, Some(503));
        assert!(err.details.is_some());
    }

    #[test]
    fn test_http_status_error_without_body() {
        let err = TransportError::http_status(500, "");
        assert_eq!(err.message, "HTTP 500");
        assert!(err.details.is_none());
    }
}
