//! Transport seam - the boundary between request preparation and the wire

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;

use crate::error::TransportError;
use crate::models::HttpMethod;

/// Fully composed request handed to a transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    /// Absolute URL without the query string
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Empty means "send no body"
    pub body: String,
    /// Raw query string, appended verbatim
    pub params: String,
}

impl TransportRequest {
    /// `url` with `params` appended after `?` (or `&` if the URL already has
    /// a query)
    pub fn full_url(&self) -> String {
        let params = self.params.trim_start_matches('?');
        if params.is_empty() {
            return self.url.clone();
        }
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.url, separator, params)
    }
}

/// What the transport reports for a request that reached the server
#[derive(Clone, Debug, PartialEq)]
pub enum TransportReply {
    Success { data: Value },
    Failure { error: String },
}

/// Sends a composed request and resolves once with the outcome.
///
/// HTTP error statuses resolve to [`TransportReply::Failure`]; only faults
/// that prevent an exchange (DNS, connect, timeout) are `Err`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportReply, TransportError>> + Send;
}

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.is_empty() {
        return base_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, params: &str) -> TransportRequest {
        TransportRequest {
            method: HttpMethod::GET,
            url: url.to_string(),
            headers: BTreeMap::new(),
            body: String::new(),
            params: params.to_string(),
        }
    }

    #[test]
    fn test_join_url_single_slash() {
        assert_eq!(
            join_url("https://erp.example.com/", "/api/resource/Item"),
            "https://erp.example.com/api/resource/Item"
        );
        assert_eq!(
            join_url("https://erp.example.com", "api/resource/Item"),
            "https://erp.example.com/api/resource/Item"
        );
    }

    #[test]
    fn test_params_appended_verbatim() {
        let req = request(
            "https://erp.example.com/api/resource/Item",
            "fields=[\"name\"]&limit_page_length=20",
        );
        assert_eq!(
            req.full_url(),
            "https://erp.example.com/api/resource/Item?fields=[\"name\"]&limit_page_length=20"
        );
    }

    #[test]
    fn test_leading_question_mark_not_doubled() {
        let req = request("https://h/x", "?a=1");
        assert_eq!(req.full_url(), "https://h/x?a=1");

        let req = request("https://h/x?debug=1", "a=1");
        assert_eq!(req.full_url(), "https://h/x?debug=1&a=1");

        let req = request("https://h/x", "");
        assert_eq!(req.full_url(), "https://h/x");
    }
}
