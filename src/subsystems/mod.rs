//! Subsystem status models backing the dashboard panels.
//!
//! The platform computes subsystem state server-side and pushes it as
//! attribute maps; this module stores the latest attributes per
//! subsystem and derives the display summaries the panels render.
//! Incident logic never runs here.

pub mod alarm;
pub mod cameras;
pub mod care;
pub mod climate;
pub mod water;
pub mod weather;

pub use alarm::AlarmSummary;
pub use cameras::CamerasSummary;
pub use care::CareSummary;
pub use climate::ClimateSummary;
pub use water::WaterSummary;
pub use weather::WeatherSummary;

use std::collections::HashMap;

use serde_json::Value;

use crate::client::{Attributes, PlatformEvent};

/// The subsystems the dashboard shows, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsystemKind {
    Alarm,
    Climate,
    Cameras,
    Care,
    Water,
    Weather,
}

impl SubsystemKind {
    pub fn all() -> &'static [SubsystemKind] {
        &[
            SubsystemKind::Alarm,
            SubsystemKind::Climate,
            SubsystemKind::Cameras,
            SubsystemKind::Care,
            SubsystemKind::Water,
            SubsystemKind::Weather,
        ]
    }

    /// Capability namespace the platform addresses this subsystem by
    pub fn namespace(self) -> &'static str {
        match self {
            SubsystemKind::Alarm => "subalarm",
            SubsystemKind::Climate => "subclimate",
            SubsystemKind::Cameras => "subcameras",
            SubsystemKind::Care => "subcare",
            SubsystemKind::Water => "subwater",
            SubsystemKind::Weather => "subweather",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubsystemKind::Alarm => "Alarm",
            SubsystemKind::Climate => "Climate",
            SubsystemKind::Cameras => "Cameras",
            SubsystemKind::Care => "Care",
            SubsystemKind::Water => "Water",
            SubsystemKind::Weather => "Weather",
        }
    }

    /// Match a platform source address like `SERV:subalarm:<place-id>`
    pub fn from_source(source: &str) -> Option<SubsystemKind> {
        let rest = source.strip_prefix("SERV:")?;
        let namespace = rest.split(':').next()?;
        SubsystemKind::all()
            .iter()
            .copied()
            .find(|k| k.namespace() == namespace)
    }
}

/// Latest attribute maps per subsystem for the active place
#[derive(Debug, Default)]
pub struct SubsystemStore {
    attributes: HashMap<SubsystemKind, Attributes>,
}

impl SubsystemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a subsystem's attributes (initial fetch)
    pub fn load(&mut self, kind: SubsystemKind, attributes: Attributes) {
        self.attributes.insert(kind, attributes);
    }

    /// Load one record from `place:ListSubsystems`; the record's
    /// `base:address` says which subsystem it is
    pub fn load_record(&mut self, record: Attributes) -> Option<SubsystemKind> {
        let kind = record
            .get("base:address")
            .and_then(Value::as_str)
            .and_then(SubsystemKind::from_source)?;
        self.attributes.insert(kind, record);
        Some(kind)
    }

    /// Merge a pushed value change into the matching subsystem.
    /// Returns the subsystem that changed, if any matched.
    pub fn apply_event(&mut self, event: &PlatformEvent) -> Option<SubsystemKind> {
        if event.message_type != "base:ValueChange" {
            return None;
        }
        let kind = SubsystemKind::from_source(&event.source)?;
        let entry = self.attributes.entry(kind).or_default();
        for (key, value) in &event.attributes {
            entry.insert(key.clone(), value.clone());
        }
        Some(kind)
    }

    /// Drop everything (place switch)
    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    fn attrs(&self, kind: SubsystemKind) -> Option<&Attributes> {
        self.attributes.get(&kind)
    }

    pub fn alarm(&self) -> AlarmSummary {
        AlarmSummary::from_attributes(self.attrs(SubsystemKind::Alarm))
    }

    pub fn climate(&self) -> ClimateSummary {
        ClimateSummary::from_attributes(self.attrs(SubsystemKind::Climate))
    }

    pub fn cameras(&self) -> CamerasSummary {
        CamerasSummary::from_attributes(self.attrs(SubsystemKind::Cameras))
    }

    pub fn care(&self) -> CareSummary {
        CareSummary::from_attributes(self.attrs(SubsystemKind::Care))
    }

    pub fn water(&self) -> WaterSummary {
        WaterSummary::from_attributes(self.attrs(SubsystemKind::Water))
    }

    pub fn weather(&self) -> WeatherSummary {
        WeatherSummary::from_attributes(self.attrs(SubsystemKind::Weather))
    }
}

// Attribute readers shared by the summary modules. Absent attributes
// read as absent, never as a panic.

pub(crate) fn attr_str<'a>(attrs: Option<&'a Attributes>, key: &str) -> Option<&'a str> {
    attrs?.get(key).and_then(Value::as_str)
}

pub(crate) fn attr_bool(attrs: Option<&Attributes>, key: &str) -> Option<bool> {
    attrs?.get(key).and_then(Value::as_bool)
}

pub(crate) fn attr_f64(attrs: Option<&Attributes>, key: &str) -> Option<f64> {
    attrs?.get(key).and_then(Value::as_f64)
}

pub(crate) fn attr_u64(attrs: Option<&Attributes>, key: &str) -> Option<u64> {
    attrs?.get(key).and_then(Value::as_u64)
}

pub(crate) fn attr_len(attrs: Option<&Attributes>, key: &str) -> usize {
    attrs
        .and_then(|a| a.get(key))
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_kind_from_source() {
        assert_eq!(
            SubsystemKind::from_source("SERV:subalarm:place-1"),
            Some(SubsystemKind::Alarm)
        );
        assert_eq!(
            SubsystemKind::from_source("SERV:subweather:place-1"),
            Some(SubsystemKind::Weather)
        );
        assert_eq!(SubsystemKind::from_source("SERV:dev:abc"), None);
        assert_eq!(SubsystemKind::from_source("garbage"), None);
    }

    #[test]
    fn test_value_change_merges_into_store() {
        let mut store = SubsystemStore::new();
        store.load(
            SubsystemKind::Alarm,
            attrs(&[
                ("subalarm:available", json!(true)),
                ("subalarm:alarmState", json!("READY")),
            ]),
        );

        let changed = store.apply_event(&PlatformEvent {
            source: "SERV:subalarm:place-1".to_string(),
            message_type: "base:ValueChange".to_string(),
            attributes: attrs(&[("subalarm:alarmState", json!("ALERTING"))]),
        });

        assert_eq!(changed, Some(SubsystemKind::Alarm));
        let alarm = store.alarm();
        assert!(alarm.available);
        assert_eq!(alarm.alarm_state, "ALERTING");
    }

    #[test]
    fn test_non_value_change_events_ignored() {
        let mut store = SubsystemStore::new();
        let changed = store.apply_event(&PlatformEvent {
            source: "SERV:subalarm:place-1".to_string(),
            message_type: "base:Added".to_string(),
            attributes: Attributes::new(),
        });
        assert_eq!(changed, None);
    }

    #[test]
    fn test_load_record_routes_by_address() {
        let mut store = SubsystemStore::new();
        let kind = store.load_record(attrs(&[
            ("base:address", json!("SERV:subclimate:place-1")),
            ("subclimate:temperature", json!(21.5)),
        ]));
        assert_eq!(kind, Some(SubsystemKind::Climate));
        assert_eq!(store.climate().temperature, Some(21.5));
    }
}
