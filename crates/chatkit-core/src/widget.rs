//! Embedding contract.
//!
//! A host drives three entry points: [`ChatWidget::initialize`],
//! [`ChatWidget::update_config`], and [`ChatWidget::dispose`]. Everything
//! in between (submissions, retry, reset) delegates to the session
//! controller; surface output arrives through the [`SurfaceHandlers`]
//! given at initialization.

use crate::backend::{Backend, HttpBackend};
use crate::config::{ConfigUpdate, WidgetConfig};
use crate::session::{CancelHandle, ConversationState, SessionController, SessionState, SurfaceHandlers};

pub struct ChatWidget<B, S> {
    controller: SessionController<B, S>,
}

impl<S: SurfaceHandlers> ChatWidget<HttpBackend, S> {
    /// Creates a widget over the real HTTP backend and activates the
    /// session. Activation failures are surfaced through `surface`, not
    /// returned.
    pub async fn initialize(config: WidgetConfig, surface: S) -> Self {
        Self::with_backend(HttpBackend::new(), config, surface).await
    }
}

impl<B: Backend + 'static, S: SurfaceHandlers> ChatWidget<B, S> {
    /// Creates a widget over a custom backend. Hosts use this for testing
    /// or transport substitution.
    pub async fn with_backend(backend: B, config: WidgetConfig, surface: S) -> Self {
        let mut controller = SessionController::new(backend, config, surface);
        controller.activate().await;
        Self { controller }
    }

    /// Submits a user message. No-op while input is locked.
    pub async fn submit(&mut self, message: &str) {
        self.controller.submit(message).await;
    }

    /// Re-sends the last failed message, if a retry is pending.
    pub async fn retry(&mut self) {
        self.controller.retry().await;
    }

    /// Clears the conversation and starts a fresh session.
    pub async fn reset(&mut self) {
        self.controller.reset().await;
    }

    /// Requests cancellation of the in-flight stream.
    pub fn cancel(&self) {
        self.controller.cancel();
    }

    /// Handle for cancelling from outside the widget's exclusive borrow
    /// (e.g. a signal handler).
    pub fn cancel_handle(&self) -> CancelHandle {
        self.controller.cancel_handle()
    }

    /// Applies credential or context changes; effective on the next
    /// submission without re-creating the widget.
    pub fn update_config(&mut self, update: ConfigUpdate) {
        self.controller.update_config(update);
    }

    pub fn state(&self) -> SessionState {
        self.controller.state()
    }

    pub fn conversation(&self) -> &ConversationState {
        self.controller.conversation()
    }

    pub fn surface(&self) -> &S {
        self.controller.surface()
    }

    /// Tears the widget down, cancelling any in-flight stream.
    pub fn dispose(self) {
        self.controller.cancel();
    }
}
