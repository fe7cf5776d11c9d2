// Error handling module
// Defines the error type surfaced by the authenticated client and the café API

use thiserror::Error;

/// Errors that can occur while talking to the café API
///
/// The type is `Clone` so a single refresh failure can be handed to every
/// request queued behind it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// No response was received (connect failure, timeout, broken body)
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401 surfaced to the caller
    #[error("Unauthorized: {message}")]
    Unauthorized { retryable: bool, message: String },

    /// Credentials could not be refreshed; the local session has been cleared
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Non-success status returned by the café API
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Whether the caller needs to log in again before retrying
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::SessionExpired(_) | ClientError::Unauthorized { .. }
        )
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
