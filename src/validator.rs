//! Pre-flight checks on a draft and session

use crate::error::ValidationError;
use crate::models::{RequestDraft, Session};

/// Check that `draft` can be sent with `session`.
///
/// Checks run in a fixed order and only the first failure is reported.
pub fn validate(draft: &RequestDraft, session: &Session) -> Result<(), ValidationError> {
    if draft.resource_type.name().is_none() {
        return Err(ValidationError::MissingResourceType);
    }

    if session.base_url.is_empty() {
        return Err(ValidationError::MissingEndpoint);
    }

    if !session.has_credentials() {
        return Err(ValidationError::MissingCredentials);
    }

    if draft.method.has_body() && !draft.body.is_empty() && !is_valid_json(&draft.body) {
        return Err(ValidationError::InvalidBody);
    }

    Ok(())
}

fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text).is_ok()
}
