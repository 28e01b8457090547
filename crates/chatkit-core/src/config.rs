//! Widget configuration.
//!
//! The embedding host supplies an endpoint base address, a bearer
//! credential, a context identifier, and named context parameters.
//! Credential and context updates after initialization apply on the next
//! submission; nothing is cached per-request.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

/// Maximum additional connection attempts after a connectivity failure.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for one widget instance.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Base address of the chat backend, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Bearer credential sent on every request.
    pub credential: String,
    /// Context identifier, e.g. `badminton`.
    pub context_type: String,
    /// Named context parameters forwarded to the backend.
    pub context: BTreeMap<String, String>,
    /// Retry ceiling for transport connectivity failures.
    pub max_retries: u32,
}

impl WidgetConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not a well-formed URL.
    pub fn new(
        base_url: impl Into<String>,
        credential: impl Into<String>,
        context_type: impl Into<String>,
    ) -> Result<Self> {
        let base_url = base_url.into();
        validate_url(&base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credential: credential.into(),
            context_type: context_type.into(),
            context: BTreeMap::new(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Adds a named context parameter.
    #[must_use]
    pub fn with_context_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Applies a partial update. Takes effect on the next submission.
    pub fn apply(&mut self, update: ConfigUpdate) {
        if let Some(credential) = update.credential {
            self.credential = credential;
        }
        if let Some(context_type) = update.context_type {
            self.context_type = context_type;
        }
        if let Some(context) = update.context {
            self.context = context;
        }
    }

    /// Endpoint for streaming turn submissions.
    pub fn stream_url(&self) -> String {
        format!("{}/chat/stream", self.base_url)
    }

    /// Endpoint for session creation and deletion.
    pub fn session_url(&self) -> String {
        format!("{}/chat/session", self.base_url)
    }
}

/// Partial configuration update (unset fields keep their current value).
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
    pub credential: Option<String>,
    pub context_type: Option<String>,
    pub context: Option<BTreeMap<String, String>>,
}

impl ConfigUpdate {
    #[must_use]
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    #[must_use]
    pub fn context_type(mut self, context_type: impl Into<String>) -> Self {
        self.context_type = Some(context_type.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: BTreeMap<String, String>) -> Self {
        self.context = Some(context);
        self
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid widget base URL: {url}"))?;
    Ok(())
}
