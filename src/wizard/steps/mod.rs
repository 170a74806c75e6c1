//! Concrete signup steps, one per stage in the registry

mod address;
mod billing;
mod plan;
mod promon;
mod security;
mod zipcode;

pub use address::AddressStep;
pub use billing::BillingStep;
pub use plan::PlanStep;
pub use promon::{PromonInfoStep, PromonPermitStep, PromonTestCallStep};
pub use security::SecurityQuestionsStep;
pub use zipcode::ZipcodeStep;

use serde_json::Value;

use crate::client::Attributes;
use crate::services::PlanLevel;

use super::stage::Stage;
use super::step::WizardStep;
use super::WizardContext;

/// Shared wizard data keys. Earlier steps write them, later steps read
/// them back; they also name what the progress file persists.
pub mod keys {
    pub const ZIPCODE: &str = "zipcode";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const STREET: &str = "street";
    pub const ADDRESS_VALID: &str = "addressValid";
    pub const PLAN: &str = "plan";
    pub const BILLING_COMPLETE: &str = "billingComplete";
    pub const BILLING_LAST4: &str = "billingLast4";
    pub const SECURITY_COMPLETE: &str = "securityComplete";
    pub const PROMON_INFO_ACKNOWLEDGED: &str = "promonInfoAcknowledged";
    pub const PROMON_PERMIT_RECORDED: &str = "promonPermitRecorded";
    pub const PROMON_PERMIT: &str = "promonPermit";
    pub const PROMON_TEST_CALL_DONE: &str = "promonTestCallCompleted";
}

/// Build the signup step list in registry order
pub fn signup_steps() -> Vec<Box<dyn WizardStep>> {
    vec![
        Box::new(ZipcodeStep::new()),
        Box::new(AddressStep::new()),
        Box::new(PlanStep::new()),
        Box::new(BillingStep::new()),
        Box::new(SecurityQuestionsStep::new()),
        Box::new(PromonInfoStep::new()),
        Box::new(PromonPermitStep::new()),
        Box::new(PromonTestCallStep::new()),
    ]
}

/// The plan recorded so far, if any
pub(crate) fn selected_plan(ctx: &WizardContext) -> Option<PlanLevel> {
    ctx.progress
        .get_str(keys::PLAN)
        .and_then(PlanLevel::from_key)
}

/// Tell the platform a stage completed. Advisory: other clients use it
/// to resume the flow, so a failure is logged, not surfaced.
pub(crate) async fn notify_transition(ctx: &WizardContext, stage: Stage) {
    let account = ctx.services.account(&ctx.identity.account_id);
    if let Err(e) = account.signup_transition(stage.key()).await {
        tracing::warn!(stage = stage.key(), error = %e, "signup transition not recorded");
    }
}

/// Build stage data from literal pairs
pub(crate) fn stage_data(pairs: &[(&str, Value)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Generic failure text for errors the step has no specific copy for
pub(crate) const GENERIC_ERROR: &str = "Something went wrong. Please try again.";
