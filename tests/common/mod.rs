//! Shared fixtures: a canned-response platform client and helpers for
//! driving wizard forms
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crossterm::event::KeyCode;
use serde_json::Value;
use tokio::sync::broadcast;

use arcus_console::client::{
    Attributes, ClientError, PlatformClient, PlatformEvent, SessionInfo, StaticResources,
};
use arcus_console::components::form::Form;
use arcus_console::services::Services;
use arcus_console::wizard::{ProgressRecorder, WizardContext, WizardController, WizardIdentity};

/// One recorded request
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub destination: String,
    pub message_type: String,
    pub attributes: Value,
}

/// Platform client answering from queued fixtures. Message types with no
/// queued response answer with empty attributes (the advisory calls).
pub struct MockPlatform {
    responses: Mutex<HashMap<String, VecDeque<Result<Attributes, ClientError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    events: broadcast::Sender<PlatformEvent>,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            events,
        })
    }

    /// Queue a successful response for a message type
    pub fn respond(&self, message_type: &str, attributes: Value) {
        let attrs = match attributes {
            Value::Object(map) => map,
            _ => Attributes::new(),
        };
        self.responses
            .lock()
            .unwrap()
            .entry(message_type.to_string())
            .or_default()
            .push_back(Ok(attrs));
    }

    /// Queue a platform error for a message type
    pub fn respond_err(&self, message_type: &str, code: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry(message_type.to_string())
            .or_default()
            .push_back(Err(ClientError::platform(code, message)));
    }

    pub fn calls_of(&self, message_type: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.message_type == message_type)
            .cloned()
            .collect()
    }

    pub fn push_event(&self, event: PlatformEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn request(
        &self,
        destination: &str,
        message_type: &str,
        attributes: Value,
    ) -> Result<Attributes, ClientError> {
        self.calls.lock().unwrap().push(RecordedCall {
            destination: destination.to_string(),
            message_type: message_type.to_string(),
            attributes,
        });
        if let Some(queue) = self.responses.lock().unwrap().get_mut(message_type) {
            if let Some(response) = queue.pop_front() {
                return response;
            }
        }
        Ok(Attributes::new())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.events.subscribe()
    }
}

/// Service layer over the mock. The static-resource base points at a
/// closed port, so document fetches fail fast and steps use their
/// built-in copy.
pub fn services(platform: Arc<MockPlatform>) -> Services {
    Services::new(platform, StaticResources::new("http://127.0.0.1:9"))
}

pub fn session_info() -> SessionInfo {
    serde_json::from_value(serde_json::json!({
        "personId": "person-1",
        "accountId": "account-1",
        "placeIds": ["place-1"],
    }))
    .unwrap()
}

pub fn identity() -> WizardIdentity {
    WizardIdentity {
        person_id: "person-1".to_string(),
        account_id: "account-1".to_string(),
        place_id: "place-1".to_string(),
    }
}

/// Context over an in-memory progress recorder
pub fn context(platform: Arc<MockPlatform>) -> WizardContext {
    WizardContext::new(services(platform), identity(), ProgressRecorder::in_memory())
}

/// Context over a persisted progress recorder
pub fn context_with_progress(
    platform: Arc<MockPlatform>,
    progress: ProgressRecorder,
) -> WizardContext {
    WizardContext::new(services(platform), identity(), progress)
}

/// The current step's form; panics if the step has none
pub fn step_form(controller: &mut WizardController) -> &mut Form {
    controller
        .current_mut()
        .expect("wizard already complete")
        .form_mut()
        .expect("current step has no form")
}

/// Type text into the focused field
pub fn type_text(form: &mut Form, text: &str) {
    for c in text.chars() {
        form.handle_key(KeyCode::Char(c));
    }
}
