//! Platform client: the WebSocket service layer the console consumes.
//!
//! The Arcus platform speaks JSON envelopes over a single WebSocket:
//! requests carry a destination address and a correlation id, responses
//! echo the correlation id, and everything without one is an unsolicited
//! event (`base:ValueChange` and friends). This module defines the
//! envelope shape, the [`PlatformClient`] trait the service wrappers and
//! tests program against, and the live session implementation.

mod error;
pub mod http;
mod session;

pub use error::{codes, ClientError};
pub use http::StaticResources;
pub use session::WsSession;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Attribute map used throughout the platform protocol
pub type Attributes = serde_json::Map<String, Value>;

/// Envelope for every message on the platform socket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub headers: Headers,
    pub payload: Payload,
}

/// Routing headers for an envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Headers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        rename = "correlationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub correlation_id: Option<String>,
    #[serde(rename = "isRequest", default)]
    pub is_request: bool,
}

/// Typed payload of an envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "messageType")]
    pub message_type: String,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Envelope {
    /// Build a request envelope
    pub fn request(
        destination: &str,
        message_type: &str,
        attributes: Attributes,
        correlation_id: String,
    ) -> Self {
        Envelope {
            kind: message_type.to_string(),
            headers: Headers {
                destination: Some(destination.to_string()),
                source: None,
                correlation_id: Some(correlation_id),
                is_request: true,
            },
            payload: Payload {
                message_type: message_type.to_string(),
                attributes,
            },
        }
    }

    /// Whether the payload is a platform Error envelope
    pub fn is_error(&self) -> bool {
        self.payload.message_type == "Error"
    }

    /// Extract the platform error from an Error envelope
    pub fn as_error(&self) -> Option<ClientError> {
        if !self.is_error() {
            return None;
        }
        let code = self
            .payload
            .attributes
            .get("code")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let message = self
            .payload
            .attributes
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("");
        Some(ClientError::platform(code, message))
    }
}

/// An unsolicited message pushed by the platform
#[derive(Debug, Clone)]
pub struct PlatformEvent {
    /// Source address (e.g. `SERV:subalarm:<place-id>`)
    pub source: String,
    /// Message type (e.g. `base:ValueChange`)
    pub message_type: String,
    /// Changed/announced attributes
    pub attributes: Attributes,
}

/// Session identity announced by the platform after the socket opens
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    #[serde(rename = "personId")]
    pub person_id: String,
    #[serde(rename = "accountId")]
    pub account_id: String,
    /// Place ids this person can access; the service layer resolves names
    #[serde(rename = "placeIds", default)]
    pub place_ids: Vec<String>,
}

/// Client side of the platform bus. Implemented by the live WebSocket
/// session and by fixture mocks in tests.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Send a request to a platform address and await the correlated
    /// response attributes. Error envelopes become
    /// [`ClientError::Platform`]. No retry, no timeout: a call either
    /// resolves or the caller surfaces its own error message.
    async fn request(
        &self,
        destination: &str,
        message_type: &str,
        attributes: Value,
    ) -> Result<Attributes, ClientError>;

    /// Subscribe to unsolicited platform events
    fn subscribe(&self) -> broadcast::Receiver<PlatformEvent>;
}

/// Coerce a `serde_json::Value` into an attribute map (requests are
/// built with `json!({...})` at call sites)
pub(crate) fn to_attributes(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        Value::Null => Attributes::new(),
        other => {
            let mut map = Attributes::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}
