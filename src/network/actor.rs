//! Network actor - runs transport calls in the Tokio runtime

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::RequestError;
use crate::executor::dispatch;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::transport::Transport;

/// Network actor that executes request commands against a transport
pub struct NetworkActor<T> {
    transport: Arc<T>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl<T: Transport + 'static> NetworkActor<T> {
    pub fn new(transport: T, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            transport: Arc::new(transport),
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteRequest { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let transport = Arc::clone(&self.transport);

                            // Calls are not cancelable once dispatched
                            self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = %request.method, "Executing request");
                                let start = Instant::now();
                                // Separate task so a panicking transport still answers this id
                                let call = tokio::spawn(async move {
                                    dispatch(transport.as_ref(), &request).await
                                });
                                let outcome = match call.await {
                                    Ok(outcome) => outcome,
                                    Err(e) => {
                                        tracing::error!(id, error = %e, "Request task failed");
                                        Err(RequestError::Execution {
                                            message: format!("Request failed: {}", e),
                                        })
                                    }
                                };
                                let elapsed = start.elapsed().as_millis() as u64;
                                tracing::info!(id, ok = outcome.is_ok(), time_ms = elapsed, "Request completed");
                                let _ = response_tx.send(NetworkResponse::from_outcome(id, outcome, elapsed));
                            });
                        }

                        Some(NetworkCommand::Shutdown) | None => break,
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Network task failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::executor::prepare;
    use crate::models::{RequestDraft, Session};
    use crate::network::transport::{TransportReply, TransportRequest};
    use serde_json::json;

    struct EchoTransport;

    impl Transport for EchoTransport {
        async fn send(&self, request: &TransportRequest) -> Result<TransportReply, TransportError> {
            Ok(TransportReply::Success {
                data: json!({ "url": request.full_url() }),
            })
        }
    }

    struct PanickingTransport;

    impl Transport for PanickingTransport {
        async fn send(&self, _request: &TransportRequest) -> Result<TransportReply, TransportError> {
            panic!("transport blew up")
        }
    }

    fn item_request() -> crate::executor::PreparedRequest {
        let mut draft = RequestDraft::default();
        draft.set_resource_type("Item");
        prepare(&draft, &Session::new("https://erp.example.com", "k", "s")).unwrap()
    }

    #[tokio::test]
    async fn test_panicking_transport_still_answers() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(PanickingTransport, resp_tx).run(cmd_rx));

        cmd_tx
            .send(NetworkCommand::ExecuteRequest { id: 3, request: item_request() })
            .unwrap();

        let response = resp_rx.recv().await.unwrap();
        assert_eq!(response.id(), 3);
        let err = response.into_outcome().unwrap_err();
        assert!(err.to_string().starts_with("Request failed"));

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_execute_reports_success_with_same_id() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(NetworkActor::new(EchoTransport, resp_tx).run(cmd_rx));

        cmd_tx
            .send(NetworkCommand::ExecuteRequest { id: 7, request: item_request() })
            .unwrap();

        let response = resp_rx.recv().await.unwrap();
        assert_eq!(response.id(), 7);
        assert_eq!(
            response.into_outcome().unwrap(),
            json!({"url": "https://erp.example.com/api/resource/Item"})
        );

        cmd_tx.send(NetworkCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
