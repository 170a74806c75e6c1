//! Water subsystem panel state

use crate::client::Attributes;

use super::{attr_bool, attr_u64};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterSummary {
    pub available: bool,
    /// Water softener salt level, percent
    pub salt_level: Option<u64>,
    /// A shutoff valve is currently closed
    pub valve_closed: bool,
    /// Platform flagged continuous water use (possible leak)
    pub continuous_use: bool,
}

impl WaterSummary {
    pub fn from_attributes(attrs: Option<&Attributes>) -> Self {
        Self {
            available: attr_bool(attrs, "subwater:available").unwrap_or(false),
            salt_level: attr_u64(attrs, "subwater:saltLevel"),
            valve_closed: attr_bool(attrs, "subwater:valveClosed").unwrap_or(false),
            continuous_use: attr_bool(attrs, "subwater:continuousUse").unwrap_or(false),
        }
    }

    pub fn status_line(&self) -> String {
        if !self.available {
            return "No water devices".to_string();
        }
        if self.continuous_use {
            return "Continuous use detected".to_string();
        }
        let mut parts = Vec::new();
        if self.valve_closed {
            parts.push("Valve closed".to_string());
        }
        if let Some(salt) = self.salt_level {
            parts.push(format!("Salt {salt}%"));
        }
        if parts.is_empty() {
            "OK".to_string()
        } else {
            parts.join(" • ")
        }
    }
}
