//! Outcome of the latest execution

use serde_json::Value;

/// What the last submit produced
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionResult {
    Success { payload: Value },
    Failure { message: String },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Text for the result panel: pretty JSON or the error message
    pub fn display_text(&self) -> String {
        match self {
            ExecutionResult::Success { payload } => {
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
            }
            ExecutionResult::Failure { message } => message.clone(),
        }
    }
}

/// Holds only the latest result; each publish replaces the previous one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultState {
    latest: Option<ExecutionResult>,
}

impl ResultState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(&mut self, payload: Value) {
        self.latest = Some(ExecutionResult::Success { payload });
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.latest = Some(ExecutionResult::Failure {
            message: message.into(),
        });
    }

    /// `None` until the first submit settles
    pub fn latest(&self) -> Option<&ExecutionResult> {
        self.latest.as_ref()
    }

    pub fn payload(&self) -> Option<&Value> {
        match &self.latest {
            Some(ExecutionResult::Success { payload }) => Some(payload),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.latest {
            Some(ExecutionResult::Failure { message }) => Some(message),
            _ => None,
        }
    }
}
