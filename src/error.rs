//! Error types for composing and sending requests

use thiserror::Error;

use crate::constants::FALLBACK_ERROR_MESSAGE;

/// Local checks that stop a draft before it reaches the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select or enter a resource type")]
    MissingResourceType,

    #[error("Please provide Base URL")]
    MissingEndpoint,

    #[error("Please provide API Key and API Secret")]
    MissingCredentials,

    #[error("Request body must be valid JSON")]
    InvalidBody,
}

/// Why a submit attempt did not produce a payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Execution { message: String },
}

/// Transport-level fault (unreachable host, timeout, malformed request).
///
/// Ordinary HTTP error statuses are not faults; they come back as a
/// failed [`TransportReply`](crate::network::TransportReply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// Structured message from the server, when one was received
    pub server_message: Option<String>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        TransportError {
            message: message.into(),
            server_message: None,
        }
    }

    pub fn with_server_message(mut self, message: impl Into<String>) -> Self {
        self.server_message = Some(message.into());
        self
    }

    /// Text shown to the operator: the server's message, else the fault
    /// text, else a generic fallback
    pub fn display_message(&self) -> String {
        non_empty(self.server_message.as_deref())
            .or_else(|| non_empty(Some(&self.message)))
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_string()
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Message for a failed reply, falling back when the transport gave none
pub fn reply_message(error: &str) -> String {
    non_empty(Some(error))
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = TransportError::new("Connection reset").with_server_message("Not permitted");
        assert_eq!(err.display_message(), "Not permitted");
    }

    #[test]
    fn test_fault_text_then_fallback() {
        assert_eq!(TransportError::new("Connection reset").display_message(), "Connection reset");
        assert_eq!(TransportError::new("").display_message(), FALLBACK_ERROR_MESSAGE);
        assert_eq!(
            TransportError::new("").with_server_message("  ").display_message(),
            FALLBACK_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_request_error_displays_validation_text() {
        let err: RequestError = ValidationError::MissingCredentials.into();
        assert_eq!(err.to_string(), "Please provide API Key and API Secret");
    }
}
