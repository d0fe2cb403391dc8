use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{DEFAULT_BODY, RESOURCE_PATH_PREFIX};

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 4] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
        }
    }

    pub fn next(&self) -> HttpMethod {
        match self {
            HttpMethod::GET => HttpMethod::POST,
            HttpMethod::POST => HttpMethod::PUT,
            HttpMethod::PUT => HttpMethod::DELETE,
            HttpMethod::DELETE => HttpMethod::GET,
        }
    }

    /// Whether the draft body is sent (and validated) for this method
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::GET)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which resource type the draft targets.
///
/// Picking from the catalog and typing a custom name are mutually exclusive:
/// whichever happened last is the one held here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    #[default]
    Unset,
    Selected(String),
    Custom(String),
}

impl ResourceType {
    /// Effective type name, `None` when nothing usable was chosen
    pub fn name(&self) -> Option<&str> {
        match self {
            ResourceType::Unset => None,
            ResourceType::Selected(name) | ResourceType::Custom(name) => {
                if name.is_empty() {
                    None
                } else {
                    Some(name)
                }
            }
        }
    }

    /// Text echoed in the selection control
    pub fn selected(&self) -> &str {
        match self {
            ResourceType::Selected(name) => name,
            _ => "",
        }
    }

    /// Text echoed in the free-form input
    pub fn custom(&self) -> &str {
        match self {
            ResourceType::Custom(text) => text,
            _ => "",
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ResourceType::Custom(_))
    }
}

/// Canonical URL path for a resource type
pub fn resource_path(resource_type: &str) -> String {
    format!("{}/{}", RESOURCE_PATH_PREFIX, resource_type)
}

/// A request being composed by the operator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub method: HttpMethod,
    pub resource_type: ResourceType,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Raw query string, passed through untouched
    pub query_params: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        RequestDraft {
            method: HttpMethod::GET,
            resource_type: ResourceType::Unset,
            url: String::new(),
            headers: BTreeMap::new(),
            body: String::from(DEFAULT_BODY),
            query_params: String::new(),
        }
    }
}

/// Endpoint and token credentials for the running process.
///
/// Never persisted: a new process starts with an empty session.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Session {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Session {
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Value of the `Authorization` header for token auth
    pub fn authorization(&self) -> String {
        format!("token {}:{}", self.api_key, self.api_secret)
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |s: &str| if s.is_empty() { "<empty>" } else { "<redacted>" };
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .finish()
    }
}
