//! Request executor - turns a validated draft into a sent request and
//! publishes the outcome
//!
//! The pieces are usable on their own: [`prepare`] composes, [`dispatch`]
//! talks to the transport, [`settle`] publishes. [`RequestExecutor`] runs
//! all three in one awaited call; the terminal shell splits them across its
//! app and network actors.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{reply_message, RequestError, ValidationError};
use crate::models::{resource_path, HttpMethod, RequestDraft, Session};
use crate::network::transport::{join_url, Transport, TransportReply, TransportRequest};
use crate::result::ResultState;
use crate::validator::validate;

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";

/// A request that passed validation, with auth merged in
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub resource_type: String,
    pub base_url: String,
    /// Path (or URL) relative to `base_url`
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub query_params: String,
}

impl PreparedRequest {
    pub fn to_transport(&self) -> TransportRequest {
        TransportRequest {
            method: self.method,
            url: join_url(&self.base_url, &self.url),
            headers: self.headers.clone(),
            body: self.body.clone(),
            params: self.query_params.clone(),
        }
    }
}

/// Validate `draft` and compose the request the transport will see
pub fn prepare(draft: &RequestDraft, session: &Session) -> Result<PreparedRequest, ValidationError> {
    validate(draft, session)?;

    let resource_type = draft
        .resource_type
        .name()
        .ok_or(ValidationError::MissingResourceType)?
        .to_string();

    let url = if draft.url.is_empty() {
        resource_path(&resource_type)
    } else {
        draft.url.clone()
    };

    // Synthesized headers replace operator headers of the same name, in any case.
    let mut headers: BTreeMap<String, String> = draft
        .headers
        .iter()
        .filter(|(key, _)| {
            !key.eq_ignore_ascii_case(AUTHORIZATION) && !key.eq_ignore_ascii_case(CONTENT_TYPE)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    headers.insert(AUTHORIZATION.to_string(), session.authorization());
    headers.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());

    let body = if draft.method.has_body() {
        draft.body.clone()
    } else {
        String::new()
    };

    Ok(PreparedRequest {
        method: draft.method,
        resource_type,
        base_url: session.base_url.clone(),
        url,
        headers,
        body,
        query_params: draft.query_params.clone(),
    })
}

/// Send `request` and wait for its single outcome. Never fails past here:
/// replies and faults alike come back as `Ok(payload)` or an
/// [`RequestError::Execution`].
pub async fn dispatch<T: Transport + ?Sized>(
    transport: &T,
    request: &PreparedRequest,
) -> Result<Value, RequestError> {
    match transport.send(&request.to_transport()).await {
        Ok(TransportReply::Success { data }) => Ok(data),
        Ok(TransportReply::Failure { error }) => Err(RequestError::Execution {
            message: reply_message(&error),
        }),
        Err(fault) => Err(RequestError::Execution {
            message: fault.display_message(),
        }),
    }
}

/// Callbacks fired when an exchange completes
pub trait ExchangeObserver {
    /// A request was sent and answered successfully
    fn request_issued(&mut self, _request: &PreparedRequest) {}

    /// The exchange settled; exactly one of `payload`/`error` is set
    fn response_received(&mut self, _payload: Option<&Value>, _error: Option<&str>) {}
}

impl ExchangeObserver for () {}

/// Publish an outcome to `results` and notify `observer`
pub fn settle<O: ExchangeObserver + ?Sized>(
    results: &mut ResultState,
    observer: &mut O,
    outcome: Result<(&PreparedRequest, Value), RequestError>,
) {
    match outcome {
        Ok((request, payload)) => {
            observer.request_issued(request);
            observer.response_received(Some(&payload), None);
            results.succeed(payload);
        }
        Err(err) => {
            let message = err.to_string();
            tracing::warn!(error = %message, "Request failed");
            observer.response_received(None, Some(&message));
            results.fail(message);
        }
    }
}

/// Shared "request in flight" flag.
///
/// Raising it does not stop a second dispatch; callers check
/// [`BusyFlag::is_busy`] before submitting.
#[derive(Clone, Debug, Default)]
pub struct BusyFlag {
    busy: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Set the flag until the returned guard is dropped
    #[must_use = "the flag is cleared as soon as the guard is dropped"]
    pub fn raise(&self) -> BusyGuard {
        self.busy.store(true, Ordering::SeqCst);
        BusyGuard {
            busy: Arc::clone(&self.busy),
        }
    }
}

/// Clears its [`BusyFlag`] on drop
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Validates, sends and publishes in one awaited call
pub struct RequestExecutor<T> {
    transport: Arc<T>,
    busy: BusyFlag,
}

impl<T: Transport> RequestExecutor<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        RequestExecutor {
            transport,
            busy: BusyFlag::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Handle for observing the in-flight state from elsewhere
    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Submit `draft`. Validation failures never reach the transport; every
    /// path ends with `results` holding the new outcome and the busy flag
    /// cleared.
    pub async fn submit<O: ExchangeObserver + ?Sized>(
        &self,
        draft: &RequestDraft,
        session: &Session,
        results: &mut ResultState,
        observer: &mut O,
    ) {
        let _guard = self.busy.raise();

        let request = match prepare(draft, session) {
            Ok(request) => request,
            Err(err) => {
                settle(results, observer, Err(err.into()));
                return;
            }
        };

        tracing::info!(
            method = %request.method,
            url = %request.url,
            resource_type = %request.resource_type,
            "Executing request"
        );

        match dispatch(self.transport.as_ref(), &request).await {
            Ok(payload) => settle(results, observer, Ok((&request, payload))),
            Err(err) => settle(results, observer, Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Transport returning a canned outcome and recording what it was sent
    struct StubTransport {
        reply: Result<TransportReply, TransportError>,
        sent: Mutex<Vec<TransportRequest>>,
    }

    impl StubTransport {
        fn new(reply: Result<TransportReply, TransportError>) -> Self {
            StubTransport {
                reply,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<TransportRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for StubTransport {
        async fn send(&self, request: &TransportRequest) -> Result<TransportReply, TransportError> {
            self.sent.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    #[derive(Default)]
    struct Recorder {
        issued: Vec<PreparedRequest>,
        responses: Vec<(Option<Value>, Option<String>)>,
    }

    impl ExchangeObserver for Recorder {
        fn request_issued(&mut self, request: &PreparedRequest) {
            self.issued.push(request.clone());
        }

        fn response_received(&mut self, payload: Option<&Value>, error: Option<&str>) {
            self.responses
                .push((payload.cloned(), error.map(str::to_string)));
        }
    }

    fn session() -> Session {
        Session::new("https://erp.example.com", "key", "secret")
    }

    fn customer_draft() -> RequestDraft {
        let mut draft = RequestDraft::default();
        draft.set_resource_type("Customer");
        draft
    }

    #[test]
    fn test_prepare_merges_auth_headers() {
        let mut draft = customer_draft();
        draft.set_header_value("Accept", "application/json");
        draft.set_header_value("authorization", "Bearer mine");
        draft.set_header_value("Content-Type", "text/plain");

        let prepared = prepare(&draft, &session()).unwrap();
        assert_eq!(prepared.headers.len(), 3);
        assert_eq!(prepared.headers["Authorization"], "token key:secret");
        assert_eq!(prepared.headers["Content-Type"], "application/json");
        assert_eq!(prepared.headers["Accept"], "application/json");
    }

    #[test]
    fn test_prepare_drops_body_for_get() {
        let mut draft = customer_draft();
        draft.set_body("{\"name\": \"ignored\"}");
        assert_eq!(prepare(&draft, &session()).unwrap().body, "");

        draft.set_method(HttpMethod::POST);
        assert_eq!(prepare(&draft, &session()).unwrap().body, "{\"name\": \"ignored\"}");
    }

    #[test]
    fn test_prepare_rederives_empty_url() {
        let mut draft = customer_draft();
        draft.set_url("");
        let prepared = prepare(&draft, &session()).unwrap();
        assert_eq!(prepared.url, "/api/resource/Customer");
        assert_eq!(
            prepared.to_transport().url,
            "https://erp.example.com/api/resource/Customer"
        );
    }

    #[test]
    fn test_prepare_keeps_manual_url_and_params() {
        let mut draft = customer_draft();
        draft.set_url("/api/resource/Customer/CUST-0001");
        draft.set_query_params("fields=[\"*\"]");
        let prepared = prepare(&draft, &session()).unwrap();
        assert_eq!(
            prepared.to_transport().full_url(),
            "https://erp.example.com/api/resource/Customer/CUST-0001?fields=[\"*\"]"
        );
    }

    #[tokio::test]
    async fn test_submit_success_publishes_payload() {
        let executor = RequestExecutor::new(StubTransport::new(Ok(TransportReply::Success {
            data: json!({"name": "Acme"}),
        })));
        let mut results = ResultState::new();
        let mut recorder = Recorder::default();

        executor
            .submit(&customer_draft(), &session(), &mut results, &mut recorder)
            .await;

        assert_eq!(results.payload(), Some(&json!({"name": "Acme"})));
        assert!(!executor.is_busy());
        assert_eq!(recorder.issued.len(), 1);
        assert_eq!(recorder.responses, vec![(Some(json!({"name": "Acme"})), None)]);
    }

    #[tokio::test]
    async fn test_validation_failure_skips_transport() {
        let executor = RequestExecutor::new(StubTransport::new(Ok(TransportReply::Success {
            data: json!(null),
        })));
        let mut results = ResultState::new();
        let mut recorder = Recorder::default();

        let mut draft = customer_draft();
        draft.set_method(HttpMethod::POST);
        draft.set_body("{bad json");
        executor
            .submit(&draft, &session(), &mut results, &mut recorder)
            .await;

        assert!(executor.transport().sent().is_empty());
        assert_eq!(results.error(), Some("Request body must be valid JSON"));
        assert!(recorder.issued.is_empty());
        assert_eq!(
            recorder.responses,
            vec![(None, Some("Request body must be valid JSON".to_string()))]
        );
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_failed_reply_becomes_failure() {
        let executor = RequestExecutor::new(StubTransport::new(Ok(TransportReply::Failure {
            error: "Customer not found".into(),
        })));
        let mut results = ResultState::new();
        executor
            .submit(&customer_draft(), &session(), &mut results, &mut ())
            .await;
        assert_eq!(results.error(), Some("Customer not found"));
    }

    #[tokio::test]
    async fn test_empty_reply_error_uses_fallback() {
        let executor = RequestExecutor::new(StubTransport::new(Ok(TransportReply::Failure {
            error: String::new(),
        })));
        let mut results = ResultState::new();
        executor
            .submit(&customer_draft(), &session(), &mut results, &mut ())
            .await;
        assert_eq!(results.error(), Some("An error occurred"));
    }

    #[tokio::test]
    async fn test_fault_prefers_server_message() {
        let fault = TransportError::new("Connection reset").with_server_message("Session expired");
        let executor = RequestExecutor::new(StubTransport::new(Err(fault)));
        let mut results = ResultState::new();
        let mut recorder = Recorder::default();
        executor
            .submit(&customer_draft(), &session(), &mut results, &mut recorder)
            .await;
        assert_eq!(results.error(), Some("Session expired"));
        assert_eq!(recorder.responses, vec![(None, Some("Session expired".to_string()))]);
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_get_sends_empty_body() {
        let executor = RequestExecutor::new(StubTransport::new(Ok(TransportReply::Success {
            data: json!([]),
        })));
        let mut draft = customer_draft();
        draft.set_body("{\"x\": 1}");
        executor
            .submit(&draft, &session(), &mut ResultState::new(), &mut ())
            .await;
        let sent = executor.transport().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "");
    }

    #[test]
    fn test_busy_guard_clears_on_drop() {
        let flag = BusyFlag::new();
        {
            let _guard = flag.raise();
            assert!(flag.is_busy());
        }
        assert!(!flag.is_busy());
    }
}
