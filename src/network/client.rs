//! HTTP client wrapper - sends composed requests with reqwest

use serde_json::Value;

use crate::constants::REQUEST_TIMEOUT;
use crate::error::TransportError;
use crate::models::HttpMethod;
use crate::network::transport::{Transport, TransportReply, TransportRequest};

/// [`Transport`] backed by a shared `reqwest::Client`
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport {
            client: create_client(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a request from the given parameters
fn build_request(client: &reqwest::Client, request: &TransportRequest) -> reqwest::RequestBuilder {
    let url = request.full_url();

    let mut req_builder = match request.method {
        HttpMethod::GET => client.get(&url),
        HttpMethod::POST => client.post(&url),
        HttpMethod::PUT => client.put(&url),
        HttpMethod::DELETE => client.delete(&url),
    };

    for (key, value) in &request.headers {
        req_builder = req_builder.header(key, value);
    }

    if request.method.has_body() && !request.body.is_empty() {
        req_builder = req_builder.body(request.body.clone());
    }

    req_builder
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportReply, TransportError> {
        let result = build_request(&self.client, request).send().await;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                let msg = if e.is_timeout() {
                    format!("Request timed out ({}s)", REQUEST_TIMEOUT.as_secs())
                } else if e.is_connect() {
                    format!("Connection failed: {}", e)
                } else {
                    format!("Request failed: {}", e)
                };
                return Err(TransportError::new(msg));
            }
        };

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Error reading body: {}", e)))?;

        let data = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

        if status.is_success() {
            Ok(TransportReply::Success { data })
        } else {
            let error = server_message(&data).unwrap_or_else(|| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
                .trim_end()
                .to_string()
            });
            Ok(TransportReply::Failure { error })
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `message`, then the JSON-encoded `_server_messages` list, then
/// `exception`.
pub fn server_message(body: &Value) -> Option<String> {
    let object = body.as_object()?;

    if let Some(message) = object.get("message").and_then(Value::as_str) {
        if !message.is_empty() {
            return Some(message.to_string());
        }
    }

    if let Some(encoded) = object.get("_server_messages").and_then(Value::as_str) {
        let messages: Vec<String> = serde_json::from_str::<Vec<String>>(encoded)
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                serde_json::from_str::<Value>(entry)
                    .ok()
                    .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            })
            .collect();
        if !messages.is_empty() {
            return Some(messages.join("\n"));
        }
    }

    object
        .get("exception")
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
