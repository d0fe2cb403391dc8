//! Network messages - communication between App and Network layers

use serde_json::Value;

use crate::error::RequestError;
use crate::executor::PreparedRequest;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Send a validated request
    ExecuteRequest { id: u64, request: PreparedRequest },

    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// The server answered with a success payload
    Success { id: u64, payload: Value, time_ms: u64 },
    /// Failed reply or transport fault, already reduced to display text
    Error { id: u64, message: String, time_ms: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Success { id, .. } => *id,
            NetworkResponse::Error { id, .. } => *id,
        }
    }

    pub fn time_ms(&self) -> u64 {
        match self {
            NetworkResponse::Success { time_ms, .. } => *time_ms,
            NetworkResponse::Error { time_ms, .. } => *time_ms,
        }
    }

    pub fn from_outcome(id: u64, outcome: Result<Value, RequestError>, time_ms: u64) -> Self {
        match outcome {
            Ok(payload) => NetworkResponse::Success { id, payload, time_ms },
            Err(err) => NetworkResponse::Error {
                id,
                message: err.to_string(),
                time_ms,
            },
        }
    }

    pub fn into_outcome(self) -> Result<Value, RequestError> {
        match self {
            NetworkResponse::Success { payload, .. } => Ok(payload),
            NetworkResponse::Error { message, .. } => Err(RequestError::Execution { message }),
        }
    }
}
