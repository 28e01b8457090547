//! Conversation/session state machine.
//!
//! [`SessionController`] owns the conversation lifecycle: it creates the
//! remote session, submits user turns through the [`Backend`], interprets
//! streamed frames, classifies failures, and drives retry and renewal
//! policy. The embedding surface only ever sees sanitized markup, chart
//! payloads, lock-state changes, and classified errors.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::backend::{Backend, TurnRequest};
use crate::charts::ChartPayload;
use crate::config::{ConfigUpdate, WidgetConfig};
use crate::markdown;
use crate::transport::{StreamHandlers, TransportError, TransportErrorKind};

/// Conversation lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No remote session yet.
    Idle,
    /// Remote session creation in flight.
    AwaitingSession,
    /// Accepting user input.
    Ready,
    /// A turn stream is in flight; input is rejected.
    Streaming,
    /// Terminal failure (credential problem); input stays rejected until an
    /// external credential refresh and a new activation.
    InputLocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation. Immutable once the turn is closed.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub charts: Vec<ChartPayload>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            charts: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Conversation data owned by the controller.
///
/// At most one turn is open (being streamed into) at any time; it is always
/// the last assistant turn while `turn_open` holds.
#[derive(Debug)]
pub struct ConversationState {
    pub conversation_id: Uuid,
    pub session_id: Option<String>,
    pub turns: Vec<Turn>,
    /// Last user message that failed, retained while retry is offered.
    pub pending_retry: Option<String>,
    pub state: SessionState,
    turn_open: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            session_id: None,
            turns: Vec::new(),
            pending_retry: None,
            state: SessionState::Idle,
            turn_open: false,
        }
    }
}

impl ConversationState {
    fn open_assistant_mut(&mut self) -> Option<&mut Turn> {
        if self.turn_open {
            self.turns.last_mut().filter(|t| t.role == Role::Assistant)
        } else {
            None
        }
    }
}

/// Classified failure categories driving UI and retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 401. Credential refresh required; no retry offered.
    AuthExpired,
    /// 403. Access denied; no retry offered.
    Forbidden,
    /// 410. Recovered transparently by re-creating the session.
    SessionExpired,
    /// Server-side failure or unrecognized status; retry offered.
    Transient,
    /// Connectivity failure after exhausted transport retries; retry offered.
    Network,
}

impl ErrorClass {
    pub fn classify(error: &TransportError) -> Self {
        match error.kind {
            TransportErrorKind::Connectivity => Self::Network,
            TransportErrorKind::Server => Self::Transient,
            TransportErrorKind::HttpStatus => match error.status {
                Some(401) => Self::AuthExpired,
                Some(403) => Self::Forbidden,
                Some(410) => Self::SessionExpired,
                _ => Self::Transient,
            },
        }
    }

    pub fn retryable(self) -> bool {
        matches!(self, Self::Transient | Self::Network)
    }

    fn user_message(self) -> &'static str {
        match self {
            Self::AuthExpired => "Your credentials have expired. Refresh them and reopen the chat.",
            Self::Forbidden => "Access to the chat service was denied.",
            Self::SessionExpired => "The conversation session expired.",
            Self::Transient => "The chat service ran into a problem. You can retry your last message.",
            Self::Network => "Unable to reach the chat service. Check your connection and retry.",
        }
    }
}

/// A classified error as surfaced to the embedding layer.
#[derive(Debug, Clone)]
pub struct SurfaceError {
    pub class: ErrorClass,
    /// User-facing summary.
    pub message: String,
    /// Underlying transport detail, for logs or expandable UI.
    pub detail: Option<String>,
    /// Whether a retry affordance should be shown.
    pub can_retry: bool,
}

/// Output callbacks to the embedding surface.
pub trait SurfaceHandlers: Send {
    /// Sanitized markup for the open assistant turn, re-rendered per update.
    fn markup_updated(&mut self, html: &str);
    /// A validated chart ready for the charting layer.
    fn chart_attached(&mut self, chart: &ChartPayload);
    /// Input lock state changed.
    fn lock_changed(&mut self, locked: bool);
    /// A classified, user-facing error.
    fn error(&mut self, error: &SurfaceError);
}

/// Cheap cloneable handle for cancelling the in-flight stream from outside
/// the controller's exclusive borrow.
#[derive(Clone)]
pub struct CancelHandle {
    backend: Arc<dyn Backend>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.backend.cancel();
    }
}

enum TurnOutcome {
    /// Terminal `done`, quiet end of stream, or cancellation.
    Completed,
    Failed(TransportError),
}

/// Drives one conversation against a [`Backend`].
pub struct SessionController<B, S> {
    backend: Arc<B>,
    config: WidgetConfig,
    conversation: ConversationState,
    surface: S,
}

impl<B: Backend + 'static, S: SurfaceHandlers> SessionController<B, S> {
    pub fn new(backend: B, config: WidgetConfig, surface: S) -> Self {
        Self {
            backend: Arc::new(backend),
            config,
            conversation: ConversationState::default(),
            surface,
        }
    }

    pub fn state(&self) -> SessionState {
        self.conversation.state
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            backend: Arc::clone(&self.backend) as Arc<dyn Backend>,
        }
    }

    /// Applies a partial configuration update; takes effect on the next
    /// backend call.
    pub fn update_config(&mut self, update: ConfigUpdate) {
        self.config.apply(update);
    }

    /// Requests cancellation of the in-flight turn stream, if any.
    pub fn cancel(&self) {
        self.backend.cancel();
    }

    /// Creates the remote session. No-op unless the conversation is idle.
    pub async fn activate(&mut self) {
        if self.conversation.state != SessionState::Idle {
            debug!("activate ignored in state {:?}", self.conversation.state);
            return;
        }
        self.conversation.state = SessionState::AwaitingSession;
        match self.backend.create_session(&self.config).await {
            Ok(info) => {
                self.conversation.session_id = Some(info.session_id);
                self.conversation.state = SessionState::Ready;
                self.surface.lock_changed(false);
            }
            Err(err) => {
                let class = ErrorClass::classify(&err);
                // A 410 before any session exists cannot be renewed away.
                let class = if class == ErrorClass::SessionExpired {
                    ErrorClass::Transient
                } else {
                    class
                };
                if class.retryable() {
                    self.conversation.state = SessionState::Idle;
                } else {
                    self.conversation.state = SessionState::InputLocked;
                }
                self.surface_error(class, &err);
            }
        }
    }

    /// Submits one user message, streaming the assistant answer.
    ///
    /// Rejected (no-op) while input is locked or a stream is in flight.
    /// Activates the session first when the conversation is still idle.
    pub async fn submit(&mut self, message: &str) {
        match self.conversation.state {
            SessionState::Idle => {
                self.activate().await;
                if self.conversation.state != SessionState::Ready {
                    return;
                }
            }
            SessionState::Ready => {}
            state => {
                debug!("submission rejected in state {state:?}");
                return;
            }
        }

        self.conversation.pending_retry = None;
        self.begin_turn(message);

        let mut renewed = false;
        loop {
            match self.run_stream(message).await {
                TurnOutcome::Completed => {
                    self.finish_turn();
                    return;
                }
                TurnOutcome::Failed(err) => {
                    let class = ErrorClass::classify(&err);
                    if class == ErrorClass::SessionExpired && !renewed {
                        renewed = true;
                        if self.renew_session().await {
                            continue;
                        }
                        // Renewal failed; fall through as a retryable error.
                        self.fail_turn(ErrorClass::Transient, &err, message);
                        return;
                    }
                    let class = if class == ErrorClass::SessionExpired {
                        ErrorClass::Transient
                    } else {
                        class
                    };
                    self.fail_turn(class, &err, message);
                    return;
                }
            }
        }
    }

    /// Re-submits the last failed user message byte for byte.
    pub async fn retry(&mut self) {
        let Some(text) = self.conversation.pending_retry.take() else {
            debug!("retry requested with nothing pending");
            return;
        };
        self.submit(&text).await;
    }

    /// Discards all local state and starts a fresh remote session.
    ///
    /// Remote cleanup failures never prevent the local clear.
    pub async fn reset(&mut self) {
        self.backend.cancel();
        let previous = self.conversation.session_id.take();
        self.conversation = ConversationState::default();
        self.surface.markup_updated("");

        if let Some(session_id) = previous
            && let Err(err) = self.backend.delete_session(&self.config, &session_id).await
        {
            debug!("session delete failed during reset: {err}");
        }
        self.activate().await;
    }

    fn begin_turn(&mut self, message: &str) {
        self.conversation.turns.push(Turn::new(Role::User, message));
        self.conversation.turns.push(Turn::new(Role::Assistant, ""));
        self.conversation.turn_open = true;
        self.conversation.state = SessionState::Streaming;
        self.surface.lock_changed(true);
    }

    fn finish_turn(&mut self) {
        self.conversation.turn_open = false;
        self.conversation.state = SessionState::Ready;
        self.surface.lock_changed(false);
    }

    fn fail_turn(&mut self, class: ErrorClass, err: &TransportError, message: &str) {
        // Drop the open assistant turn; it never completed.
        if self.conversation.open_assistant_mut().is_some() {
            self.conversation.turns.pop();
        }
        self.conversation.turn_open = false;

        if class.retryable() {
            // Roll back the user turn too; retry re-appends the pair.
            self.conversation.turns.pop();
            self.conversation.pending_retry = Some(message.to_string());
            self.conversation.state = SessionState::Ready;
            self.surface.lock_changed(false);
        } else {
            self.conversation.state = SessionState::InputLocked;
        }
        self.surface_error(class, err);
    }

    fn surface_error(&mut self, class: ErrorClass, err: &TransportError) {
        warn!("surfacing {class:?} error: {err}");
        self.surface.error(&SurfaceError {
            class,
            message: class.user_message().to_string(),
            detail: Some(err.message.clone()),
            can_retry: class.retryable(),
        });
    }

    /// Transparently replaces an expired remote session.
    async fn renew_session(&mut self) -> bool {
        match self.backend.create_session(&self.config).await {
            Ok(info) => {
                debug!("session renewed after expiry");
                self.conversation.session_id = Some(info.session_id);
                // Discard any partial answer from the failed attempt.
                if let Some(turn) = self.conversation.open_assistant_mut() {
                    turn.text.clear();
                    turn.charts.clear();
                }
                true
            }
            Err(err) => {
                warn!("session renewal failed: {err}");
                false
            }
        }
    }

    async fn run_stream(&mut self, message: &str) -> TurnOutcome {
        let Self {
            backend,
            config,
            conversation,
            surface,
        } = self;
        let request = TurnRequest {
            message: message.to_string(),
            context_type: config.context_type.clone(),
            context: config.context.clone(),
            session_id: conversation.session_id.clone(),
        };
        let mut sink = TurnSink {
            conversation,
            surface,
            outcome: TurnOutcome::Completed,
        };
        backend.stream_turn(config, &request, &mut sink).await;
        sink.outcome
    }
}

/// Frame handlers for one stream invocation.
///
/// The exclusive borrow ties each sink to exactly one stream; a superseded
/// stream's sink is gone before the next one starts, so late callbacks have
/// nowhere to land.
struct TurnSink<'a, S: SurfaceHandlers> {
    conversation: &'a mut ConversationState,
    surface: &'a mut S,
    outcome: TurnOutcome,
}

impl<S: SurfaceHandlers> StreamHandlers for TurnSink<'_, S> {
    fn on_retry(&mut self) {
        // The replayed attempt re-delivers every frame; keeping the partial
        // answer would duplicate it.
        if let Some(turn) = self.conversation.open_assistant_mut()
            && !(turn.text.is_empty() && turn.charts.is_empty())
        {
            turn.text.clear();
            turn.charts.clear();
            self.surface.markup_updated("");
        }
    }

    fn on_message(&mut self, text: &str) {
        let Some(turn) = self.conversation.open_assistant_mut() else {
            return;
        };
        turn.text.push_str(text);
        let html = markdown::render(&turn.text);
        self.surface.markup_updated(&html);
    }

    fn on_chart(&mut self, chart: ChartPayload) {
        let Some(turn) = self.conversation.open_assistant_mut() else {
            return;
        };
        turn.charts.push(chart.clone());
        self.surface.chart_attached(&chart);
    }

    fn on_done(&mut self) {
        self.outcome = TurnOutcome::Completed;
    }

    fn on_error(&mut self, error: TransportError) {
        self.outcome = TurnOutcome::Failed(error);
    }
}
