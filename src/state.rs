//! Explicit application state.
//!
//! The session's shared state lives in one container constructed at
//! startup and handed to the screens that need it; there is no ambient
//! global to reach for. Mutations go through the typed accessors below.

use chrono::{DateTime, Utc};

use crate::client::{PlatformEvent, SessionInfo};
use crate::services::{Device, PlaceDescriptor};
use crate::subsystems::{SubsystemKind, SubsystemStore};

/// The place the session is currently focused on
#[derive(Debug, Clone)]
pub struct ActivePlace {
    pub place_id: String,
    pub name: String,
}

/// Shared session state for the console
pub struct AppState {
    person_id: String,
    account_id: String,
    active_place: Option<ActivePlace>,
    places: Vec<PlaceDescriptor>,
    devices: Vec<Device>,
    subsystems: SubsystemStore,
    devices_refreshed_at: Option<DateTime<Utc>>,
}

impl AppState {
    pub fn new(session: &SessionInfo) -> Self {
        Self {
            person_id: session.person_id.clone(),
            account_id: session.account_id.clone(),
            active_place: None,
            places: Vec::new(),
            devices: Vec::new(),
            subsystems: SubsystemStore::new(),
            devices_refreshed_at: None,
        }
    }

    pub fn person_id(&self) -> &str {
        &self.person_id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn active_place(&self) -> Option<&ActivePlace> {
        self.active_place.as_ref()
    }

    /// Switch the active place. Devices and subsystem state belong to
    /// the previous place, so they reset.
    pub fn set_active_place(&mut self, place_id: String, name: String) {
        self.active_place = Some(ActivePlace { place_id, name });
        self.devices.clear();
        self.devices_refreshed_at = None;
        self.subsystems.clear();
    }

    pub fn places(&self) -> &[PlaceDescriptor] {
        &self.places
    }

    pub fn set_places(&mut self, places: Vec<PlaceDescriptor>) {
        self.places = places;
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn set_devices(&mut self, devices: Vec<Device>) {
        self.devices = devices;
        self.devices_refreshed_at = Some(Utc::now());
    }

    pub fn devices_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.devices_refreshed_at
    }

    pub fn subsystems(&self) -> &SubsystemStore {
        &self.subsystems
    }

    pub fn subsystems_mut(&mut self) -> &mut SubsystemStore {
        &mut self.subsystems
    }

    /// Feed a pushed platform event into the state it affects.
    /// Returns the subsystem that changed, if any.
    pub fn apply_platform_event(&mut self, event: &PlatformEvent) -> Option<SubsystemKind> {
        self.subsystems.apply_event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Attributes;
    use serde_json::json;

    fn session() -> SessionInfo {
        serde_json::from_value(json!({
            "personId": "person-1",
            "accountId": "account-1",
            "placeIds": ["place-1"],
        }))
        .unwrap()
    }

    #[test]
    fn test_place_switch_resets_place_scoped_state() {
        let mut state = AppState::new(&session());
        state.set_active_place("place-1".to_string(), "Main house".to_string());
        state.set_devices(vec![]);
        state.subsystems_mut().load(
            SubsystemKind::Alarm,
            [("subalarm:available".to_string(), json!(true))]
                .into_iter()
                .collect::<Attributes>(),
        );
        assert!(state.devices_refreshed_at().is_some());
        assert!(state.subsystems().alarm().available);

        state.set_active_place("place-2".to_string(), "Cabin".to_string());
        assert!(state.devices_refreshed_at().is_none());
        assert!(!state.subsystems().alarm().available);
        assert_eq!(state.active_place().unwrap().name, "Cabin");
    }

    #[test]
    fn test_events_route_to_subsystems() {
        let mut state = AppState::new(&session());
        let changed = state.apply_platform_event(&PlatformEvent {
            source: "SERV:subwater:place-1".to_string(),
            message_type: "base:ValueChange".to_string(),
            attributes: [
                ("subwater:available".to_string(), json!(true)),
                ("subwater:continuousUse".to_string(), json!(true)),
            ]
            .into_iter()
            .collect(),
        });
        assert_eq!(changed, Some(SubsystemKind::Water));
        assert!(state.subsystems().water().continuous_use);
    }
}
