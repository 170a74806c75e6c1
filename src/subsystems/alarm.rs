//! Alarm subsystem panel state

use crate::client::Attributes;

use super::{attr_bool, attr_len, attr_str};

/// What the alarm panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSummary {
    pub available: bool,
    /// INACTIVE / READY / PREALERT / ALERTING / CLEARING, as pushed
    pub alarm_state: String,
    /// Security mode: INACTIVE / DISARMED / ON / PARTIAL
    pub security_mode: String,
    /// Alert types currently active (SECURITY, SMOKE, CO, PANIC, WATER)
    pub active_alerts: usize,
}

impl AlarmSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subalarm:available").unwrap_or(false),
            alarm_state: attr_str(attrs, "subalarm:alarmState")
                .unwrap_or("INACTIVE")
                .to_string(),
            security_mode: attr_str(attrs, "subalarm:securityMode")
                .unwrap_or("INACTIVE")
                .to_string(),
            active_alerts: attr_len(attrs, "subalarm:activeAlerts"),
        }
    }

    pub fn is_alerting(&self) -> bool {
        self.alarm_state == "ALERTING" || self.alarm_state == "PREALERT"
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "No alarm devices".to_string();
        }
        if self.is_alerting() {
            return format!("ALARM — {} active", self.active_alerts);
        }
        match self.security_mode.as_str() {
            "ON" => "Armed".to_string(),
            "PARTIAL" => "Armed (partial)".to_string(),
            "DISARMED" => "Disarmed".to_string(),
            _ => "Off".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alerting_overrides_mode() {
        let attrs: Attributes = [
            ("subalarm:available".to_string(), json!(true)),
            ("subalarm:alarmState".to_string(), json!("ALERTING")),
            ("subalarm:securityMode".to_string(), json!("ON")),
            ("subalarm:activeAlerts".to_string(), json!(["SMOKE"])),
        ]
        .into_iter()
        .collect();

        let summary = AlarmSummary::from_attributes(Some(&attrs));
        assert!(summary.is_alerting());
        assert_eq!(summary.status_line(), "ALARM — 1 active");
    }

    #[test]
    fn test_missing_subsystem_is_unavailable() {
        let summary = AlarmSummary::from_attributes(None);
        assert!(!summary.available);
        assert_eq!(summary.status_line(), "No alarm devices");
    }
}
