//! Session service: the person's entry point onto the platform

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{Attributes, ClientError, PlatformClient};

use super::parse_field;

const DESTINATION: &str = "SERV:sess:";

/// A place this person can access, as listed by the session service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDescriptor {
    #[serde(rename = "placeId")]
    pub place_id: String,
    #[serde(rename = "name")]
    pub name: String,
    /// OWNER or OTHER, as the platform reports it
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub city: Option<String>,
}

pub struct SessionService {
    client: Arc<dyn PlatformClient>,
}

impl SessionService {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    /// List the places available to the session's person
    pub async fn list_available_places(&self) -> Result<Vec<PlaceDescriptor>, ClientError> {
        let attrs = self
            .client
            .request(DESTINATION, "sess:ListAvailablePlaces", json!({}))
            .await?;
        parse_field(&attrs, "places")
    }

    /// Make a place the active one for this session; the platform starts
    /// pushing that place's subsystem and device events afterwards.
    /// Returns the place's attributes.
    pub async fn set_active_place(&self, place_id: &str) -> Result<Attributes, ClientError> {
        self.client
            .request(
                DESTINATION,
                "sess:SetActivePlace",
                json!({ "placeId": place_id }),
            )
            .await
    }
}
