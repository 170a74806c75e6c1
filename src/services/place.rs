//! Place service: ZIP lookup, address validation, device inventory

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{Attributes, ClientError, PlatformClient};

use super::parse_field;

const DESTINATION: &str = "SERV:place:";

/// City/state resolved for a ZIP code
#[derive(Debug, Clone, Deserialize)]
pub struct ZipInfo {
    pub city: String,
    pub state: String,
}

/// Address fields submitted for validation
#[derive(Debug, Clone, Serialize)]
pub struct AddressQuery {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

/// Result of a platform address check
#[derive(Debug, Clone, Deserialize)]
pub struct AddressCheck {
    pub valid: bool,
    /// Corrected alternatives the platform offers when the address
    /// doesn't verify exactly
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A device at a place, as the dashboard lists it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub address: String,
    pub name: String,
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub online: bool,
    /// Capability namespaces the device exposes (e.g. `swit`, `dim`)
    #[serde(default)]
    pub capabilities: Vec<String>,
}

pub struct PlaceService {
    client: Arc<dyn PlatformClient>,
}

impl PlaceService {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    fn place_destination(place_id: &str) -> String {
        format!("SERV:place:{place_id}")
    }

    /// Resolve a ZIP code to city/state. Fails with `zip.unrecognized`
    /// for ZIP codes the platform doesn't know.
    pub async fn lookup_zipcode(&self, zipcode: &str) -> Result<ZipInfo, ClientError> {
        let attrs = self
            .client
            .request(
                DESTINATION,
                "place:LookupZipcode",
                json!({ "zipcode": zipcode }),
            )
            .await?;
        serde_json::from_value(serde_json::Value::Object(attrs))
            .map_err(|e| ClientError::malformed(format!("bad zip lookup: {e}")))
    }

    /// Ask the platform to verify a street address
    pub async fn validate_address(&self, query: &AddressQuery) -> Result<AddressCheck, ClientError> {
        let attrs = self
            .client
            .request(
                DESTINATION,
                "place:ValidateAddress",
                serde_json::to_value(query)
                    .map_err(|e| ClientError::malformed(e.to_string()))?,
            )
            .await?;
        serde_json::from_value(serde_json::Value::Object(attrs))
            .map_err(|e| ClientError::malformed(format!("bad address check: {e}")))
    }

    /// List the devices paired at a place
    pub async fn list_devices(&self, place_id: &str) -> Result<Vec<Device>, ClientError> {
        let attrs = self
            .client
            .request(
                &Self::place_destination(place_id),
                "place:ListDevices",
                json!({}),
            )
            .await?;
        parse_field(&attrs, "devices")
    }

    /// Fetch the current attribute maps for a place's subsystems (the
    /// initial panel state; later changes arrive as value-change events)
    pub async fn list_subsystems(&self, place_id: &str) -> Result<Vec<Attributes>, ClientError> {
        let attrs = self
            .client
            .request(
                &Self::place_destination(place_id),
                "place:ListSubsystems",
                json!({}),
            )
            .await?;
        parse_field(&attrs, "subsystems")
    }
}
