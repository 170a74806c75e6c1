//! Professional monitoring service: availability, settings, permit,
//! monitoring-station test call

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{ClientError, PlatformClient};

use super::parse_field;

const DESTINATION: &str = "SERV:promon:";

/// Whether professional monitoring can be offered for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromonAvailability {
    /// Full monitoring offered
    Full,
    /// Trial-only coverage
    Trial,
    /// Not offered at this address
    None,
}

impl PromonAvailability {
    pub fn is_available(self) -> bool {
        !matches!(self, PromonAvailability::None)
    }
}

/// Monitoring settings for a place
#[derive(Debug, Clone, Deserialize)]
pub struct PromonSettings {
    #[serde(default)]
    pub trial: bool,
    /// Whether the jurisdiction requires an alarm permit on file
    #[serde(rename = "permitRequired", default)]
    pub permit_required: bool,
}

pub struct ProMonitoringService {
    client: Arc<dyn PlatformClient>,
}

impl ProMonitoringService {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    fn place_destination(place_id: &str) -> String {
        format!("SERV:promon:{place_id}")
    }

    /// Check monitoring availability for a ZIP/state pair
    pub async fn check_availability(
        &self,
        zipcode: &str,
        state: &str,
    ) -> Result<PromonAvailability, ClientError> {
        let attrs = self
            .client
            .request(
                DESTINATION,
                "promon:CheckAvailability",
                json!({ "zipcode": zipcode, "state": state }),
            )
            .await?;
        parse_field(&attrs, "availability")
    }

    /// Fetch the monitoring settings for a place
    pub async fn get_settings(&self, place_id: &str) -> Result<PromonSettings, ClientError> {
        let attrs = self
            .client
            .request(
                &Self::place_destination(place_id),
                "promon:GetSettings",
                json!({}),
            )
            .await?;
        serde_json::from_value(serde_json::Value::Object(attrs))
            .map_err(|e| ClientError::malformed(format!("bad promon settings: {e}")))
    }

    /// Record the alarm permit number for a place
    pub async fn update_permit(&self, place_id: &str, permit: &str) -> Result<(), ClientError> {
        self.client
            .request(
                &Self::place_destination(place_id),
                "promon:UpdatePermit",
                json!({ "permitNumber": permit }),
            )
            .await?;
        Ok(())
    }

    /// Place the monitoring-station test call for a place
    pub async fn complete_test_call(&self, place_id: &str) -> Result<(), ClientError> {
        self.client
            .request(
                &Self::place_destination(place_id),
                "promon:TestCall",
                json!({}),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_parses_platform_keys() {
        let full: PromonAvailability = serde_json::from_str("\"FULL\"").unwrap();
        let none: PromonAvailability = serde_json::from_str("\"NONE\"").unwrap();
        assert!(full.is_available());
        assert!(!none.is_available());
    }
}
