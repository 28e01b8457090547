//! Backend seam between the session controller and the chat service.
//!
//! The controller talks to a [`Backend`] trait object so tests can script
//! turn outcomes without a network. [`HttpBackend`] is the real
//! implementation: JSON calls for session lifecycle plus the streaming
//! turn endpoint via [`StreamTransport`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::transport::{StreamHandlers, StreamRequest, StreamTransport, TransportError};

/// Body of a streamed turn submission.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRequest {
    pub message: String,
    pub context_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Body of a session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest {
    pub context_type: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

/// Server-assigned session handle.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
}

/// Chat service operations needed by the session controller.
///
/// Implementations take the config per call so credential or context
/// updates apply to the next request without rebuilding the backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Creates a server-side session and returns its handle.
    async fn create_session(&self, config: &WidgetConfig) -> Result<SessionInfo, TransportError>;

    /// Deletes a server-side session. Failures are non-fatal to callers.
    async fn delete_session(
        &self,
        config: &WidgetConfig,
        session_id: &str,
    ) -> Result<(), TransportError>;

    /// Streams one turn, dispatching frames to `handlers` until terminal.
    async fn stream_turn(
        &self,
        config: &WidgetConfig,
        request: &TurnRequest,
        handlers: &mut (dyn StreamHandlers + Send),
    );

    /// Requests cancellation of the in-flight turn stream, if any.
    fn cancel(&self);
}

/// Production backend over HTTP.
pub struct HttpBackend {
    http: reqwest::Client,
    transport: StreamTransport,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpBackend {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            transport: StreamTransport::new(),
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::http_status(status.as_u16(), &body))
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn create_session(&self, config: &WidgetConfig) -> Result<SessionInfo, TransportError> {
        let body = SessionRequest {
            context_type: config.context_type.clone(),
            context: config.context.clone(),
        };
        let response = self
            .http
            .post(config.session_url())
            .bearer_auth(&config.credential)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                TransportError::connectivity(format!("Session request failed: {err}"))
            })?;
        let response = Self::check_status(response).await?;
        response.json::<SessionInfo>().await.map_err(|err| {
            TransportError::connectivity(format!("Malformed session response: {err}"))
        })
    }

    async fn delete_session(
        &self,
        config: &WidgetConfig,
        session_id: &str,
    ) -> Result<(), TransportError> {
        let url = format!("{}/{session_id}", config.session_url());
        let response = self
            .http
            .delete(url)
            .bearer_auth(&config.credential)
            .send()
            .await
            .map_err(|err| {
                TransportError::connectivity(format!("Session delete failed: {err}"))
            })?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn stream_turn(
        &self,
        config: &WidgetConfig,
        request: &TurnRequest,
        handlers: &mut (dyn StreamHandlers + Send),
    ) {
        self.transport
            .stream(
                StreamRequest {
                    endpoint: &config.stream_url(),
                    body: request,
                    credential: &config.credential,
                    max_retries: config.max_retries,
                },
                handlers,
            )
            .await;
    }

    fn cancel(&self) {
        self.transport.cancel();
    }
}
