//! Climate subsystem panel state

use crate::client::Attributes;

use super::{attr_bool, attr_f64, attr_len};

#[derive(Debug, Clone, PartialEq)]
pub struct ClimateSummary {
    pub available: bool,
    /// Reading from the primary temperature device, °C as pushed
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub thermostats: usize,
    pub active_fans: usize,
}

impl ClimateSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subclimate:available").unwrap_or(false),
            temperature: attr_f64(attrs, "subclimate:temperature"),
            humidity: attr_f64(attrs, "subclimate:humidity"),
            thermostats: attr_len(attrs, "subclimate:thermostats"),
            active_fans: attr_len(attrs, "subclimate:activeFans"),
        }
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "No climate devices".to_string();
        }
        let mut parts = Vec::new();
        if let Some(temp) = self.temperature {
            parts.push(format!("{:.0}°", temp));
        }
        if let Some(humidity) = self.humidity {
            parts.push(format!("{humidity:.0}% rh"));
        }
        if self.thermostats > 0 {
            parts.push(format!("{} thermostats", self.thermostats));
        }
        if parts.is_empty() {
            "Idle".to_string()
        } else {
            parts.join(" • ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_line_joins_readings() {
        let attrs: Attributes = [
            ("subclimate:available".to_string(), json!(true)),
            ("subclimate:temperature".to_string(), json!(21.6)),
            ("subclimate:humidity".to_string(), json!(44.0)),
            (
                "subclimate:thermostats".to_string(),
                json!(["DRIV:dev:1", "DRIV:dev:2"]),
            ),
        ]
        .into_iter()
        .collect();

        let summary = ClimateSummary::from_attributes(Some(&attrs));
        assert_eq!(summary.thermostats, 2);
        assert_eq!(summary.status_line(), "22° • 44% rh • 2 thermostats");
    }
}
