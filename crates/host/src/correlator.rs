//! Request/response correlation over a single host channel.
//!
//! [`RequestCorrelator::send`] tags every outbound request with a fresh
//! UUID, parks a one-shot resolver under that id, and suspends until
//! [`RequestCorrelator::on_message`] sees the matching response. Responses
//! may arrive in any order. Each id resolves at most once: the entry is
//! removed on response, on timeout, and when the awaiting future is
//! dropped.
//!
//! The correlator is mechanical. It owns no retry or readiness policy;
//! those live in [`WalletHost`](crate::session::WalletHost).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::events::HostEvent;
use crate::messages::{parse_message, HostErrorBody, HostMessage, RequestEnvelope};
use crate::transport::{Transport, TransportError};

type Outcome = Result<serde_json::Value, HostErrorBody>;

struct PendingRequest {
    event: HostEvent,
    resolver: oneshot::Sender<Outcome>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingRequest>>>;

/// What [`RequestCorrelator::on_message`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The host ready signal; not a correlated response.
    Ready,
    /// A pending request was resolved with data.
    Resolved { id: String },
    /// A pending request was rejected with a host error.
    Rejected { id: String },
    /// No request with this id is pending (late, duplicate or cancelled).
    Unmatched { id: String },
    /// The id is pending but for a different event; the entry is kept.
    EventMismatch { id: String },
    /// The message could not be parsed.
    Malformed,
}

#[derive(Debug, thiserror::Error)]
pub enum CorrelationError {
    #[error("Host returned {}: {}", .0.kind, .0.message)]
    Host(HostErrorBody),

    #[error("No response to {event} within {timeout:?}")]
    Timeout { event: HostEvent, timeout: Duration },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to encode {event} request: {source}")]
    Encode {
        event: HostEvent,
        source: serde_json::Error,
    },

    #[error("Failed to decode {event} response: {source}")]
    Decode {
        event: HostEvent,
        source: serde_json::Error,
    },

    /// The pending entry was discarded (e.g. the connection dropped).
    #[error("{0} request abandoned before a response arrived")]
    Abandoned(HostEvent),
}

/// Multiplexes request/response exchanges over one [`Transport`].
pub struct RequestCorrelator {
    transport: Arc<dyn Transport>,
    pending: PendingMap,
}

/// Removes a pending entry when the awaiting future finishes or is dropped.
struct PendingGuard {
    id: String,
    pending: PendingMap,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.id);
    }
}

impl RequestCorrelator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Send `payload` as `event` and wait for the correlated response.
    ///
    /// The pending entry is registered before the transport write so a
    /// response delivered on another task cannot outrun it. With
    /// `timeout`, the entry is removed on expiry and a late response is
    /// then reported as [`Dispatch::Unmatched`].
    pub async fn send<Req, Resp>(
        &self,
        event: HostEvent,
        payload: &Req,
        timeout: Option<Duration>,
    ) -> Result<Resp, CorrelationError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let id = uuid::Uuid::new_v4().to_string();
        let text = serde_json::to_string(&RequestEnvelope {
            id: &id,
            event: event.as_str(),
            data: payload,
        })
        .map_err(|source| CorrelationError::Encode { event, source })?;

        let (resolver, outcome) = oneshot::channel();
        let _guard = self.register(&id, event, resolver);

        tracing::debug!(request_id = %id, %event, "Sending host request");
        self.transport.send(text).await?;

        let outcome = match timeout {
            Some(limit) => match tokio::time::timeout(limit, outcome).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!(request_id = %id, %event, ?limit, "Host request timed out");
                    return Err(CorrelationError::Timeout {
                        event,
                        timeout: limit,
                    });
                }
            },
            None => outcome.await,
        };

        let data = outcome
            .map_err(|_| CorrelationError::Abandoned(event))?
            .map_err(CorrelationError::Host)?;

        serde_json::from_value(data).map_err(|source| CorrelationError::Decode { event, source })
    }

    /// Route one inbound message to its pending request.
    ///
    /// Never fails: unmatched and malformed messages are logged and
    /// reported through the returned [`Dispatch`].
    pub fn on_message(&self, raw: &str) -> Dispatch {
        let message = match parse_message(raw) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, raw_message = %raw, "Failed to parse host message");
                return Dispatch::Malformed;
            }
        };

        let (id, event, outcome) = match message {
            HostMessage::Ready => return Dispatch::Ready,
            HostMessage::Response { id, event, data } => (id, event, Ok(data)),
            HostMessage::Error { id, event, error } => (id, event, Err(error)),
        };

        let entry = {
            let mut pending = lock(&self.pending);
            let expected = pending.get(&id).map(|entry| entry.event);
            match expected {
                None => None,
                Some(expected) if expected.as_str() != event => {
                    tracing::warn!(
                        request_id = %id,
                        %expected,
                        received = %event,
                        "Host response event does not match request",
                    );
                    return Dispatch::EventMismatch { id };
                }
                Some(_) => pending.remove(&id),
            }
        };

        let Some(entry) = entry else {
            tracing::debug!(request_id = %id, %event, "Ignoring host response with no pending request");
            return Dispatch::Unmatched { id };
        };

        let dispatch = match &outcome {
            Ok(_) => Dispatch::Resolved { id: id.clone() },
            Err(error) => {
                tracing::debug!(
                    request_id = %id,
                    %event,
                    error_type = %error.kind,
                    error_message = %error.message,
                    "Host request failed",
                );
                Dispatch::Rejected { id: id.clone() }
            }
        };

        // The caller may have stopped waiting in the meantime.
        let _ = entry.resolver.send(outcome);
        dispatch
    }

    /// Number of requests awaiting a response.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    /// Whether request `id` is still awaiting a response.
    pub fn is_pending(&self, id: &str) -> bool {
        lock(&self.pending).contains_key(id)
    }

    /// Drop every pending request; their callers get
    /// [`CorrelationError::Abandoned`].
    pub fn abandon_all(&self) {
        let drained: Vec<(String, PendingRequest)> = lock(&self.pending).drain().collect();
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Abandoning pending host requests");
        }
    }

    fn register(
        &self,
        id: &str,
        event: HostEvent,
        resolver: oneshot::Sender<Outcome>,
    ) -> PendingGuard {
        lock(&self.pending).insert(id.to_string(), PendingRequest { event, resolver });
        PendingGuard {
            id: id.to_string(),
            pending: Arc::clone(&self.pending),
        }
    }
}

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<String, PendingRequest>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    use crate::messages::WalletAddressResponse;
    use crate::transport::ChannelTransport;

    fn correlator() -> (Arc<RequestCorrelator>, mpsc::UnboundedReceiver<String>) {
        let (transport, rx) = ChannelTransport::new();
        (Arc::new(RequestCorrelator::new(Arc::new(transport))), rx)
    }

    /// Read the next outbound envelope and return its id and event.
    async fn next_request(rx: &mut mpsc::UnboundedReceiver<String>) -> (String, String) {
        let raw = rx.recv().await.expect("a request should be sent");
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        (
            value["id"].as_str().unwrap().to_string(),
            value["event"].as_str().unwrap().to_string(),
        )
    }

    fn spawn_create(
        correlator: &Arc<RequestCorrelator>,
        timeout: Option<Duration>,
    ) -> tokio::task::JoinHandle<Result<WalletAddressResponse, CorrelationError>> {
        let correlator = Arc::clone(correlator);
        tokio::spawn(async move {
            correlator
                .send(
                    HostEvent::WalletCreate,
                    &serde_json::json!({"accessToken": "tok"}),
                    timeout,
                )
                .await
        })
    }

    #[tokio::test]
    async fn success_response_resolves_once_and_clears_entry() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);

        let (id, event) = next_request(&mut rx).await;
        assert_eq!(event, "wallet:create");
        assert_eq!(correlator.pending_count(), 1);

        let response =
            format!(r#"{{"id":"{id}","event":"wallet:create","data":{{"address":"0xABC"}}}}"#);
        assert_eq!(correlator.on_message(&response), Dispatch::Resolved { id: id.clone() });

        let result = task.await.unwrap().unwrap();
        assert_eq!(result.address, "0xABC");
        assert_eq!(correlator.pending_count(), 0);

        // A duplicate delivery is a no-op.
        assert_eq!(correlator.on_message(&response), Dispatch::Unmatched { id });
    }

    #[tokio::test]
    async fn error_response_carries_type_and_message() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);

        let (id, _) = next_request(&mut rx).await;
        let response = format!(
            r#"{{"id":"{id}","event":"wallet:create","error":{{"type":"wallet_exists","message":"already created"}}}}"#
        );
        assert_eq!(correlator.on_message(&response), Dispatch::Rejected { id });

        let err = task.await.unwrap().unwrap_err();
        let body = assert_matches!(err, CorrelationError::Host(body) => body);
        assert_eq!(body.kind, "wallet_exists");
        assert_eq!(body.message, "already created");
    }

    #[tokio::test]
    async fn unmatched_id_leaves_other_requests_pending() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);
        let (id, _) = next_request(&mut rx).await;

        let stray = r#"{"id":"not-a-real-id","event":"wallet:create","data":{"address":"0xBAD"}}"#;
        assert_eq!(
            correlator.on_message(stray),
            Dispatch::Unmatched { id: "not-a-real-id".into() }
        );
        assert_eq!(correlator.pending_count(), 1);
        assert!(!task.is_finished());

        let response =
            format!(r#"{{"id":"{id}","event":"wallet:create","data":{{"address":"0xGOOD"}}}}"#);
        correlator.on_message(&response);
        assert_eq!(task.await.unwrap().unwrap().address, "0xGOOD");
    }

    #[tokio::test]
    async fn responses_resolve_out_of_order() {
        let (correlator, mut rx) = correlator();
        let first = spawn_create(&correlator, None);
        let (first_id, _) = next_request(&mut rx).await;
        let second = spawn_create(&correlator, None);
        let (second_id, _) = next_request(&mut rx).await;

        correlator.on_message(&format!(
            r#"{{"id":"{second_id}","event":"wallet:create","data":{{"address":"0x2"}}}}"#
        ));
        correlator.on_message(&format!(
            r#"{{"id":"{first_id}","event":"wallet:create","data":{{"address":"0x1"}}}}"#
        ));

        assert_eq!(first.await.unwrap().unwrap().address, "0x1");
        assert_eq!(second.await.unwrap().unwrap().address, "0x2");
    }

    #[tokio::test]
    async fn event_mismatch_keeps_entry_pending() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);
        let (id, _) = next_request(&mut rx).await;

        let wrong = format!(r#"{{"id":"{id}","event":"wallet:rpc","data":{{}}}}"#);
        assert_eq!(
            correlator.on_message(&wrong),
            Dispatch::EventMismatch { id: id.clone() }
        );
        assert_eq!(correlator.pending_count(), 1);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_removes_entry_and_late_response_is_ignored() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, Some(Duration::from_secs(20)));
        let (id, _) = next_request(&mut rx).await;

        let err = task.await.unwrap().unwrap_err();
        assert_matches!(
            err,
            CorrelationError::Timeout { event: HostEvent::WalletCreate, timeout } if timeout == Duration::from_secs(20)
        );
        assert_eq!(correlator.pending_count(), 0);

        let late = format!(r#"{{"id":"{id}","event":"wallet:create","data":{{"address":"0x1"}}}}"#);
        assert_eq!(correlator.on_message(&late), Dispatch::Unmatched { id });
    }

    #[tokio::test]
    async fn dropped_future_removes_entry() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);
        next_request(&mut rx).await;
        assert_eq!(correlator.pending_count(), 1);

        task.abort();
        let _ = task.await;
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_removes_entry() {
        let (correlator, rx) = correlator();
        drop(rx);

        let result: Result<WalletAddressResponse, _> = correlator
            .send(HostEvent::WalletCreate, &serde_json::json!({}), None)
            .await;
        assert_matches!(result, Err(CorrelationError::Transport(TransportError::Closed)));
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn abandon_all_fails_waiting_callers() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);
        next_request(&mut rx).await;

        correlator.abandon_all();
        assert_matches!(
            task.await.unwrap(),
            Err(CorrelationError::Abandoned(HostEvent::WalletCreate))
        );
    }

    #[tokio::test]
    async fn abandoned_request_is_no_longer_pending() {
        let (correlator, mut rx) = correlator();
        let task = spawn_create(&correlator, None);
        let (id, _) = next_request(&mut rx).await;
        assert!(correlator.is_pending(&id));

        correlator.abandon_all();
        assert!(!correlator.is_pending(&id));
        let _ = task.await;
    }

    #[test]
    fn ready_and_malformed_messages_are_side_channels() {
        let (transport, _rx) = ChannelTransport::new();
        let correlator = RequestCorrelator::new(Arc::new(transport));
        assert_eq!(correlator.on_message("ready"), Dispatch::Ready);
        assert_eq!(correlator.on_message("{oops"), Dispatch::Malformed);
    }
}
