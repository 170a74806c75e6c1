//! Scheduler service: weekly schedule commands for devices

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{Attributes, ClientError, PlatformClient};
use crate::scheduling::ScheduleEvent;

use super::parse_field;

const DESTINATION: &str = "SERV:scheduler:";

/// A scheduler attached to a device, as listed for a place
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerInfo {
    /// Device address the scheduler drives
    pub target: String,
    #[serde(rename = "nextFireTime", default)]
    pub next_fire_time: Option<String>,
    /// Configured command attribute maps, parseable by
    /// [`ScheduleEvent::from_attributes`]
    #[serde(default)]
    pub commands: Vec<Attributes>,
}

pub struct SchedulerService {
    client: Arc<dyn PlatformClient>,
}

impl SchedulerService {
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self { client }
    }

    /// List schedulers for every scheduled device at a place
    pub async fn list_schedulers(&self, place_id: &str) -> Result<Vec<SchedulerInfo>, ClientError> {
        let attrs = self
            .client
            .request(
                DESTINATION,
                "scheduler:ListSchedulers",
                json!({ "placeId": place_id }),
            )
            .await?;
        parse_field(&attrs, "schedulers")
    }

    /// Add a weekly command to a device's schedule; returns the new
    /// command id
    pub async fn schedule_weekly_command(
        &self,
        target: &str,
        schedule_id: &str,
        event: &ScheduleEvent,
    ) -> Result<String, ClientError> {
        event
            .validate()
            .map_err(|e| ClientError::malformed(e.to_string()))?;
        let mut attributes = event.to_attributes();
        attributes.insert("target".to_string(), json!(target));
        attributes.insert("scheduleId".to_string(), json!(schedule_id));
        let attrs = self
            .client
            .request(
                DESTINATION,
                "scheduler:ScheduleWeeklyCommand",
                Value::Object(attributes),
            )
            .await?;
        parse_field(&attrs, "commandId")
    }

    /// Replace an existing weekly command
    pub async fn update_weekly_command(
        &self,
        target: &str,
        schedule_id: &str,
        command_id: &str,
        event: &ScheduleEvent,
    ) -> Result<(), ClientError> {
        event
            .validate()
            .map_err(|e| ClientError::malformed(e.to_string()))?;
        let mut attributes = event.to_attributes();
        attributes.insert("target".to_string(), json!(target));
        attributes.insert("scheduleId".to_string(), json!(schedule_id));
        attributes.insert("commandId".to_string(), json!(command_id));
        self.client
            .request(
                DESTINATION,
                "scheduler:UpdateWeeklyCommand",
                Value::Object(attributes),
            )
            .await?;
        Ok(())
    }

    /// Remove a command from a device's schedule
    pub async fn delete_command(
        &self,
        target: &str,
        schedule_id: &str,
        command_id: &str,
    ) -> Result<(), ClientError> {
        self.client
            .request(
                DESTINATION,
                "scheduler:DeleteCommand",
                json!({
                    "target": target,
                    "scheduleId": schedule_id,
                    "commandId": command_id,
                }),
            )
            .await?;
        Ok(())
    }
}
