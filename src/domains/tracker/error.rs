//! Tracker-specific error types.

use thiserror::Error;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The update request or issue reference was rejected before any call was made.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The request never produced an HTTP response (connect failure, timeout, ...).
    #[error("Request to {url} failed: {message}")]
    Http {
        url: String,
        message: String,
        transient: bool,
    },

    /// The tracker answered with a non-success status.
    #[error("Tracker rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The tracker answered, but the body was not what we expected.
    #[error("Invalid tracker response: {0}")]
    InvalidResponse(String),

    /// The client is missing required configuration.
    #[error("Tracker is not configured: {0}")]
    NotConfigured(String),
}

impl TrackerError {
    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new API error.
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    /// Create a new invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether the backend refused a value it was given.
    ///
    /// Only these failures are worth explaining with the field's legal values;
    /// permission and transport failures are reported as-is.
    pub fn is_value_rejection(&self) -> bool {
        matches!(self, Self::Api { status: 400, .. })
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { transient, .. } => *transient,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        Self::Http {
            url,
            transient: err.is_timeout() || err.is_connect(),
            message,
        }
    }
}
