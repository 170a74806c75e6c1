//! Scheduling support: which device capabilities can be scheduled, and
//! the weekly schedule event model the scheduler service speaks.
//!
//! The platform owns schedule execution (including sunrise/sunset
//! resolution); this module only shapes configuration.

use std::collections::HashMap;

use chrono::NaiveTime;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::Attributes;

/// Days of the week as the scheduler service keys them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub fn all() -> &'static [Day] {
        &[
            Day::Mon,
            Day::Tue,
            Day::Wed,
            Day::Thu,
            Day::Fri,
            Day::Sat,
            Day::Sun,
        ]
    }

    pub fn key(self) -> &'static str {
        match self {
            Day::Mon => "MON",
            Day::Tue => "TUE",
            Day::Wed => "WED",
            Day::Thu => "THU",
            Day::Fri => "FRI",
            Day::Sat => "SAT",
            Day::Sun => "SUN",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "Monday",
            Day::Tue => "Tuesday",
            Day::Wed => "Wednesday",
            Day::Thu => "Thursday",
            Day::Fri => "Friday",
            Day::Sat => "Saturday",
            Day::Sun => "Sunday",
        }
    }
}

/// When within a day a schedule event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeMode {
    /// At a fixed time of day
    Absolute,
    /// Relative to sunrise, offset by minutes
    Sunrise,
    /// Relative to sunset, offset by minutes
    Sunset,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("an absolute schedule event needs a time of day")]
    MissingTime,
    #[error("a schedule event needs at least one day")]
    NoDays,
    #[error("bad schedule attributes: {0}")]
    Malformed(String),
}

/// One weekly schedule entry: on these days, at this time (or around
/// sunrise/sunset), apply these attributes to the device
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    pub days: Vec<Day>,
    pub mode: TimeMode,
    /// Required for [`TimeMode::Absolute`], ignored otherwise
    pub time: Option<NaiveTime>,
    /// Signed minutes around sunrise/sunset; negative fires before
    pub offset_minutes: i32,
    /// Attribute values the scheduler applies when the event fires
    pub attributes: Attributes,
}

impl ScheduleEvent {
    /// A fixed-time event
    pub fn at(days: Vec<Day>, time: NaiveTime, attributes: Attributes) -> Self {
        Self {
            days,
            mode: TimeMode::Absolute,
            time: Some(time),
            offset_minutes: 0,
            attributes,
        }
    }

    /// A sunrise/sunset-relative event
    pub fn solar(days: Vec<Day>, mode: TimeMode, offset_minutes: i32, attributes: Attributes) -> Self {
        Self {
            days,
            mode,
            time: None,
            offset_minutes,
            attributes,
        }
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.days.is_empty() {
            return Err(ScheduleError::NoDays);
        }
        if self.mode == TimeMode::Absolute && self.time.is_none() {
            return Err(ScheduleError::MissingTime);
        }
        Ok(())
    }

    /// Shape this event the way `scheduler:ScheduleWeeklyCommand` wants it
    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert(
            "days".to_string(),
            json!(self.days.iter().map(|d| d.key()).collect::<Vec<_>>()),
        );
        attrs.insert("mode".to_string(), serde_json::to_value(self.mode).unwrap_or(Value::Null));
        if let Some(time) = self.time {
            attrs.insert(
                "time".to_string(),
                Value::String(time.format("%H:%M:%S").to_string()),
            );
        }
        attrs.insert("offsetMinutes".to_string(), json!(self.offset_minutes));
        attrs.insert(
            "attributes".to_string(),
            Value::Object(self.attributes.clone()),
        );
        attrs
    }

    /// Human-readable line for schedule listings, e.g.
    /// `MON WED FRI — 4:31 PM` or `SAT — 5 minutes before sunset`
    pub fn describe(&self) -> String {
        let days = self
            .days
            .iter()
            .map(|d| d.key())
            .collect::<Vec<_>>()
            .join(" ");
        let when = match self.mode {
            TimeMode::Absolute => self
                .time
                .map(|t| crate::components::TimeEditor::from_time(t).display())
                .unwrap_or_default(),
            mode => crate::components::OffsetMinutes::new(self.offset_minutes).display(mode),
        };
        format!("{days} — {when}")
    }

    /// Parse a platform schedule command back into an event
    pub fn from_attributes(attrs: &Attributes) -> Result<Self, ScheduleError> {
        let days: Vec<Day> = attrs
            .get("days")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ScheduleError::Malformed(e.to_string()))?
            .unwrap_or_default();
        let mode: TimeMode = attrs
            .get("mode")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| ScheduleError::Malformed(e.to_string()))?
            .unwrap_or(TimeMode::Absolute);
        let time = match attrs.get("time").and_then(Value::as_str) {
            Some(text) => Some(
                NaiveTime::parse_from_str(text, "%H:%M:%S")
                    .map_err(|e| ScheduleError::Malformed(format!("bad time `{text}`: {e}")))?,
            ),
            None => None,
        };
        let offset_minutes = attrs
            .get("offsetMinutes")
            .and_then(Value::as_i64)
            .unwrap_or(0) as i32;
        let attributes = attrs
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let event = Self {
            days,
            mode,
            time,
            offset_minutes,
            attributes,
        };
        event.validate()?;
        Ok(event)
    }
}

/// What the scheduler can drive for one device capability
#[derive(Debug, Clone, Copy)]
pub struct SchedulerCommands {
    /// Scheduler group the UI files the device under
    pub group: &'static str,
    /// Attributes a schedule event may set
    pub attributes: &'static [&'static str],
}

/// Capability namespace → schedulable commands. Mirrors the platform's
/// scheduler configuration; first matching capability wins.
static REGISTRY: Lazy<HashMap<&'static str, SchedulerCommands>> = Lazy::new(|| {
    HashMap::from([
        (
            "swit",
            SchedulerCommands {
                group: "LIGHT",
                attributes: &["swit:state"],
            },
        ),
        (
            "dim",
            SchedulerCommands {
                group: "LIGHT",
                attributes: &["swit:state", "dim:brightness"],
            },
        ),
        (
            "therm",
            SchedulerCommands {
                group: "CLIMATE",
                attributes: &["therm:hvacmode", "therm:coolsetpoint", "therm:heatsetpoint"],
            },
        ),
        (
            "fan",
            SchedulerCommands {
                group: "CLIMATE",
                attributes: &["fan:speed", "swit:state"],
            },
        ),
        (
            "spaceheater",
            SchedulerCommands {
                group: "CLIMATE",
                attributes: &["spaceheater:heatstate", "spaceheater:setpoint"],
            },
        ),
        (
            "vent",
            SchedulerCommands {
                group: "CLIMATE",
                attributes: &["vent:level"],
            },
        ),
        (
            "valv",
            SchedulerCommands {
                group: "WATER",
                attributes: &["valv:valvestate"],
            },
        ),
        (
            "waterheater",
            SchedulerCommands {
                group: "WATER",
                attributes: &["waterheater:setpoint"],
            },
        ),
        (
            "petdoor",
            SchedulerCommands {
                group: "DOORS",
                attributes: &["petdoor:lockstate"],
            },
        ),
    ])
});

/// Commands for a single capability namespace
pub fn commands_for(capability: &str) -> Option<&'static SchedulerCommands> {
    REGISTRY.get(capability)
}

/// Whether (and how) a device with these capabilities can be scheduled.
/// Dimmers also expose `swit`; more specific namespaces are preferred.
pub fn schedulable(capabilities: &[String]) -> Option<(&'static str, &'static SchedulerCommands)> {
    const PREFERENCE: &[&str] = &[
        "therm",
        "spaceheater",
        "waterheater",
        "dim",
        "fan",
        "vent",
        "valv",
        "petdoor",
        "swit",
    ];
    for cap in PREFERENCE.iter().copied() {
        if capabilities.iter().any(|c| c == cap) {
            if let Some(commands) = REGISTRY.get(cap) {
                return Some((cap, commands));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_on() -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("swit:state".to_string(), json!("ON"));
        attrs
    }

    #[test]
    fn test_absolute_event_attributes() {
        let event = ScheduleEvent::at(
            vec![Day::Mon, Day::Wed, Day::Fri],
            NaiveTime::from_hms_opt(16, 31, 0).unwrap(),
            light_on(),
        );
        let attrs = event.to_attributes();
        assert_eq!(attrs["days"], json!(["MON", "WED", "FRI"]));
        assert_eq!(attrs["mode"], json!("ABSOLUTE"));
        assert_eq!(attrs["time"], json!("16:31:00"));
        assert_eq!(attrs["attributes"]["swit:state"], json!("ON"));
    }

    #[test]
    fn test_sunset_event_keeps_signed_offset() {
        let event = ScheduleEvent::solar(vec![Day::Sat], TimeMode::Sunset, -5, light_on());
        let attrs = event.to_attributes();
        assert_eq!(attrs["mode"], json!("SUNSET"));
        assert_eq!(attrs["offsetMinutes"], json!(-5));

        let parsed = ScheduleEvent::from_attributes(&attrs).unwrap();
        assert_eq!(parsed.offset_minutes, -5);
        assert_eq!(parsed.mode, TimeMode::Sunset);
    }

    #[test]
    fn test_absolute_event_requires_time() {
        let event = ScheduleEvent {
            days: vec![Day::Mon],
            mode: TimeMode::Absolute,
            time: None,
            offset_minutes: 0,
            attributes: Attributes::new(),
        };
        assert_eq!(event.validate(), Err(ScheduleError::MissingTime));
    }

    #[test]
    fn test_event_requires_days() {
        let event = ScheduleEvent::solar(vec![], TimeMode::Sunrise, 10, Attributes::new());
        assert_eq!(event.validate(), Err(ScheduleError::NoDays));
    }

    #[test]
    fn test_describe_absolute_and_solar() {
        let event = ScheduleEvent::at(
            vec![Day::Mon, Day::Wed, Day::Fri],
            NaiveTime::from_hms_opt(16, 31, 0).unwrap(),
            light_on(),
        );
        assert_eq!(event.describe(), "MON WED FRI — 4:31 PM");

        let event = ScheduleEvent::solar(vec![Day::Sat], TimeMode::Sunset, -5, light_on());
        assert_eq!(event.describe(), "SAT — 5 minutes before sunset");
    }

    #[test]
    fn test_dimmer_prefers_dim_over_swit() {
        let caps = vec!["base".to_string(), "swit".to_string(), "dim".to_string()];
        let (cap, commands) = schedulable(&caps).unwrap();
        assert_eq!(cap, "dim");
        assert_eq!(commands.group, "LIGHT");
        assert!(commands.attributes.contains(&"dim:brightness"));
    }

    #[test]
    fn test_unschedulable_device() {
        let caps = vec!["base".to_string(), "pres".to_string()];
        assert!(schedulable(&caps).is_none());
    }
}
