//! Typed service wrappers over the platform bus.
//!
//! Each remote Arcus service gets a thin wrapper that shapes requests and
//! parses response attributes; the wire format itself belongs to the
//! platform. Wrappers share one [`PlatformClient`] handle, so a mock
//! client swaps the whole layer out in tests.

pub mod account;
pub mod person;
pub mod place;
pub mod promonitoring;
pub mod scheduler;
pub mod session;

pub use account::{AccountService, BillingInfo, PlanLevel};
pub use person::{PersonService, SecurityQuestion};
pub use place::{AddressCheck, AddressQuery, Device, PlaceService, ZipInfo};
pub use promonitoring::{ProMonitoringService, PromonAvailability, PromonSettings};
pub use scheduler::{SchedulerInfo, SchedulerService};
pub use session::{PlaceDescriptor, SessionService};

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::{Attributes, ClientError, PlatformClient, StaticResources};

/// Bundle handed to screens and wizard steps: one client, many services
#[derive(Clone)]
pub struct Services {
    client: Arc<dyn PlatformClient>,
    resources: StaticResources,
}

impl Services {
    pub fn new(client: Arc<dyn PlatformClient>, resources: StaticResources) -> Self {
        Self { client, resources }
    }

    /// The underlying platform client (for event subscription)
    pub fn client(&self) -> Arc<dyn PlatformClient> {
        self.client.clone()
    }

    /// Static HTTPS resources (documents outside the message bus)
    pub fn resources(&self) -> &StaticResources {
        &self.resources
    }

    pub fn session(&self) -> SessionService {
        SessionService::new(self.client.clone())
    }

    pub fn places(&self) -> PlaceService {
        PlaceService::new(self.client.clone())
    }

    pub fn account(&self, account_id: &str) -> AccountService {
        AccountService::new(self.client.clone(), account_id)
    }

    pub fn person(&self, person_id: &str) -> PersonService {
        PersonService::new(self.client.clone(), person_id)
    }

    pub fn promonitoring(&self) -> ProMonitoringService {
        ProMonitoringService::new(self.client.clone())
    }

    pub fn scheduler(&self) -> SchedulerService {
        SchedulerService::new(self.client.clone())
    }
}

/// Pull a typed field out of response attributes
pub(crate) fn parse_field<T: DeserializeOwned>(
    attrs: &Attributes,
    key: &str,
) -> Result<T, ClientError> {
    let value = attrs
        .get(key)
        .cloned()
        .ok_or_else(|| ClientError::malformed(format!("response missing `{key}`")))?;
    serde_json::from_value(value).map_err(|e| ClientError::malformed(format!("bad `{key}`: {e}")))
}
