//! Live WebSocket session against the Arcus platform.
//!
//! One socket carries everything: requests are matched to responses by
//! correlation id, and unsolicited messages (subsystem value changes,
//! device added/removed) fan out to subscribers over a broadcast channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    to_attributes, Attributes, ClientError, Envelope, PlatformClient, PlatformEvent, SessionInfo,
};

/// Capacity of the event fan-out channel; lagging consumers drop
/// events and refetch full attribute state
const EVENT_CHANNEL_CAPACITY: usize = 256;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<Result<Attributes, ClientError>>>>>;

/// A connected platform session
pub struct WsSession {
    outgoing: mpsc::UnboundedSender<Message>,
    pending: PendingMap,
    events: broadcast::Sender<PlatformEvent>,
    info: SessionInfo,
}

impl WsSession {
    /// Open the socket, authenticate with the bearer token, and wait for
    /// the platform's `SessionCreated` announcement.
    pub async fn connect(url: &str, token: &str) -> Result<Self, ClientError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ClientError::transport(e.to_string()))?;
        let auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ClientError::transport(e.to_string()))?;
        request.headers_mut().insert("Authorization", auth);

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ClientError::transport(e.to_string()))?;
        let (mut write, mut read) = stream.split();

        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (session_tx, session_rx) = oneshot::channel::<SessionInfo>();

        // Writer: drain the outgoing queue onto the socket
        tokio::spawn(async move {
            while let Some(message) = outgoing_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    warn!(error = %e, "platform socket write failed");
                    break;
                }
            }
        });

        // Reader: route responses to pending requests, fan out events
        let reader_pending = pending.clone();
        let reader_events = events.clone();
        tokio::spawn(async move {
            let mut session_tx = Some(session_tx);
            while let Some(message) = read.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(error = %e, "platform socket read failed");
                        break;
                    }
                };
                match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => Self::dispatch(
                        envelope,
                        &reader_pending,
                        &reader_events,
                        &mut session_tx,
                    ),
                    Err(e) => warn!(error = %e, "unparseable platform message"),
                }
            }
            // Socket gone: fail anything still waiting
            let mut pending = reader_pending.lock().expect("pending map poisoned");
            for (_, waiter) in pending.drain() {
                let _ = waiter.send(Err(ClientError::SessionClosed));
            }
        });

        let info = session_rx.await.map_err(|_| ClientError::SessionClosed)?;
        debug!(person = %info.person_id, "platform session established");

        Ok(Self {
            outgoing,
            pending,
            events,
            info,
        })
    }

    /// Identity announced by the platform for this session
    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    fn dispatch(
        envelope: Envelope,
        pending: &PendingMap,
        events: &broadcast::Sender<PlatformEvent>,
        session_tx: &mut Option<oneshot::Sender<SessionInfo>>,
    ) {
        if envelope.payload.message_type == "SessionCreated" {
            if let Some(tx) = session_tx.take() {
                match serde_json::from_value::<SessionInfo>(Value::Object(
                    envelope.payload.attributes.clone(),
                )) {
                    Ok(info) => {
                        let _ = tx.send(info);
                    }
                    Err(e) => warn!(error = %e, "malformed SessionCreated"),
                }
            }
            return;
        }

        if let Some(correlation_id) = envelope.headers.correlation_id.clone() {
            let waiter = {
                let mut pending = pending.lock().expect("pending map poisoned");
                pending.remove(&correlation_id)
            };
            if let Some(waiter) = waiter {
                let result = match envelope.as_error() {
                    Some(err) => Err(err),
                    None => Ok(envelope.payload.attributes),
                };
                let _ = waiter.send(result);
            } else {
                debug!(correlation_id, "response with no pending request");
            }
            return;
        }

        // No correlation id: unsolicited event
        let event = PlatformEvent {
            source: envelope.headers.source.unwrap_or_default(),
            message_type: envelope.payload.message_type,
            attributes: envelope.payload.attributes,
        };
        let _ = events.send(event);
    }
}

#[async_trait]
impl PlatformClient for WsSession {
    async fn request(
        &self,
        destination: &str,
        message_type: &str,
        attributes: Value,
    ) -> Result<Attributes, ClientError> {
        let correlation_id = Uuid::new_v4().to_string();
        let envelope = Envelope::request(
            destination,
            message_type,
            to_attributes(attributes),
            correlation_id.clone(),
        );
        let text =
            serde_json::to_string(&envelope).map_err(|e| ClientError::malformed(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().expect("pending map poisoned");
            pending.insert(correlation_id.clone(), tx);
        }

        if self.outgoing.send(Message::Text(text)).is_err() {
            let mut pending = self.pending.lock().expect("pending map poisoned");
            pending.remove(&correlation_id);
            return Err(ClientError::SessionClosed);
        }

        rx.await.unwrap_or(Err(ClientError::SessionClosed))
    }

    fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.events.subscribe()
    }
}
