//! Care subsystem panel state

use crate::client::Attributes;

use super::{attr_bool, attr_len, attr_str};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareSummary {
    pub available: bool,
    /// ON or VISIT, as pushed
    pub alarm_mode: String,
    /// Configured care behaviors (curfew, inactivity windows)
    pub behaviors: usize,
    pub triggered: bool,
}

impl CareSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subcare:available").unwrap_or(false),
            alarm_mode: attr_str(attrs, "subcare:alarmMode")
                .unwrap_or("VISIT")
                .to_string(),
            behaviors: attr_len(attrs, "subcare:behaviors"),
            triggered: attr_str(attrs, "subcare:alarmState") == Some("ALERT"),
        }
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "Not set up".to_string();
        }
        if self.triggered {
            return "CARE ALERT".to_string();
        }
        let behaviors = match self.behaviors {
            0 => "no behaviors".to_string(),
            1 => "1 behavior".to_string(),
            n => format!("{n} behaviors"),
        };
        format!("{} • {behaviors}", self.alarm_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_wins() {
        let attrs: Attributes = [
            ("subcare:available".to_string(), json!(true)),
            ("subcare:alarmMode".to_string(), json!("ON")),
            ("subcare:alarmState".to_string(), json!("ALERT")),
        ]
        .into_iter()
        .collect();

        let summary = CareSummary::from_attributes(Some(&attrs));
        assert!(summary.triggered);
        assert_eq!(summary.status_line(), "CARE ALERT");
    }

    #[test]
    fn test_behavior_count_pluralizes() {
        let attrs: Attributes = [
            ("subcare:available".to_string(), json!(true)),
            ("subcare:alarmMode".to_string(), json!("VISIT")),
            ("subcare:behaviors".to_string(), json!(["b1"])),
        ]
        .into_iter()
        .collect();

        let summary = CareSummary::from_attributes(Some(&attrs));
        assert_eq!(summary.status_line(), "VISIT • 1 behavior");
    }
}
