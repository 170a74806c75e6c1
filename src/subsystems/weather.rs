//! Weather subsystem panel state (NOAA alerts via weather radios)

use crate::client::Attributes;

use super::{attr_bool, attr_len, attr_str};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherSummary {
    pub available: bool,
    /// READY or ALERT, as pushed
    pub alert_state: String,
    /// Radios currently broadcasting an alert
    pub alerting_radios: usize,
    /// EAS event code of the last alert, if any (e.g. TOR, SVR)
    pub last_alert: Option<String>,
}

impl WeatherSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subweather:available").unwrap_or(false),
            alert_state: attr_str(attrs, "subweather:weatherAlert")
                .unwrap_or("READY")
                .to_string(),
            alerting_radios: attr_len(attrs, "subweather:alertingRadios"),
            last_alert: attr_str(attrs, "subweather:lastWeatherAlert").map(String::from),
        }
    }

    pub fn is_alerting(&self) -> bool {
        self.alert_state == "ALERT"
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "No weather radios".to_string();
        }
        if self.is_alerting() {
            return match &self.last_alert {
                Some(code) => format!("WEATHER ALERT ({code})"),
                None => "WEATHER ALERT".to_string(),
            };
        }
        "No alerts".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_includes_eas_code() {
        let attrs: Attributes = [
            ("subweather:available".to_string(), json!(true)),
            ("subweather:weatherAlert".to_string(), json!("ALERT")),
            ("subweather:lastWeatherAlert".to_string(), json!("TOR")),
            ("subweather:alertingRadios".to_string(), json!(["r1"])),
        ]
        .into_iter()
        .collect();

        let summary = WeatherSummary::from_attributes(Some(&attrs));
        assert!(summary.is_alerting());
        assert_eq!(summary.alerting_radios, 1);
        assert_eq!(summary.status_line(), "WEATHER ALERT (TOR)");
    }
}
