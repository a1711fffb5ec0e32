//! UniFi client errors

use thiserror::Error;

/// Errors that can occur when interacting with the UniFi Site Manager API
#[derive(Debug, Error)]
pub enum UniFiError {
    /// Caller input was rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The API answered with a non-success status
    #[error("API request failed: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response payload
        body: String,
    },

    /// Connectivity or timeout failure in the HTTP layer
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not carry the expected JSON
    #[error("Invalid JSON response from API: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UniFiError {
    /// Shorthand for a validation failure
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status carried by the error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Validation(_) | Self::Decode(_) => None,
        }
    }

    /// True for 401 and 403 responses
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// True when the transport gave up waiting for the server
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}
