//! Account service: signup progress, service plan, billing

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::{ClientError, PlatformClient};

/// Service level a signup can land on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanLevel {
    #[serde(rename = "BASIC")]
    Basic,
    #[serde(rename = "PREMIUM")]
    Premium,
    #[serde(rename = "PREMIUM_PROMON")]
    PremiumPromon,
}

impl PlanLevel {
    pub fn all() -> &'static [PlanLevel] {
        &[PlanLevel::Basic, PlanLevel::Premium, PlanLevel::PremiumPromon]
    }

    /// The platform's service-level key
    pub fn key(self) -> &'static str {
        match self {
            PlanLevel::Basic => "BASIC",
            PlanLevel::Premium => "PREMIUM",
            PlanLevel::PremiumPromon => "PREMIUM_PROMON",
        }
    }

    pub fn from_key(key: &str) -> Option<PlanLevel> {
        PlanLevel::all().iter().copied().find(|p| p.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            PlanLevel::Basic => "Basic",
            PlanLevel::Premium => "Premium",
            PlanLevel::PremiumPromon => "Premium + Professional Monitoring",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PlanLevel::Basic => "Live control of your home from the dashboard",
            PlanLevel::Premium => "Adds video storage and extended history",
            PlanLevel::PremiumPromon => "Adds 24/7 professional alarm monitoring",
        }
    }

    /// Whether this plan includes professional monitoring (gates the
    /// `web:promon.*` wizard stages)
    pub fn is_promon(self) -> bool {
        matches!(self, PlanLevel::PremiumPromon)
    }
}

/// Card details submitted to billing. Never logged, never persisted; the
/// progress recorder only ever sees the last four digits.
#[derive(Debug, Clone)]
pub struct BillingInfo {
    pub name_on_card: String,
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub verification_value: String,
}

impl BillingInfo {
    pub fn last4(&self) -> String {
        let digits: String = self.number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].to_string()
    }
}

pub struct AccountService {
    client: Arc<dyn PlatformClient>,
    account_id: String,
}

impl AccountService {
    pub fn new(client: Arc<dyn PlatformClient>, account_id: &str) -> Self {
        Self {
            client,
            account_id: account_id.to_string(),
        }
    }

    fn destination(&self) -> String {
        format!("SERV:account:{}", self.account_id)
    }

    /// Tell the platform which signup stage just completed, so other
    /// clients resume the flow at the same point
    pub async fn signup_transition(&self, step_completed: &str) -> Result<(), ClientError> {
        self.client
            .request(
                &self.destination(),
                "account:SignupTransition",
                json!({ "stepcompleted": step_completed }),
            )
            .await?;
        Ok(())
    }

    /// Select the account's service plan
    pub async fn update_service_plan(&self, plan: PlanLevel) -> Result<(), ClientError> {
        self.client
            .request(
                &self.destination(),
                "account:UpdateServicePlan",
                json!({ "serviceLevel": plan.key() }),
            )
            .await?;
        Ok(())
    }

    /// Submit card details. Fails with `card.*` codes on rejection.
    pub async fn update_billing_info(&self, billing: &BillingInfo) -> Result<(), ClientError> {
        self.client
            .request(
                &self.destination(),
                "account:UpdateBillingInfoCC",
                json!({
                    "billingFirstName": billing.name_on_card,
                    "billingCardNumber": billing.number,
                    "billingExpirationMonth": billing.exp_month,
                    "billingExpirationYear": billing.exp_year,
                    "billingVerificationValue": billing.verification_value,
                }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_level_keys_round_trip() {
        for plan in PlanLevel::all() {
            assert_eq!(PlanLevel::from_key(plan.key()), Some(*plan));
        }
        assert_eq!(PlanLevel::from_key("GOLD"), None);
    }

    #[test]
    fn test_only_promon_plan_is_promon() {
        assert!(PlanLevel::PremiumPromon.is_promon());
        assert!(!PlanLevel::Premium.is_promon());
        assert!(!PlanLevel::Basic.is_promon());
    }

    #[test]
    fn test_billing_last4() {
        let billing = BillingInfo {
            name_on_card: "Pat Doe".to_string(),
            number: "4111 1111 1111 1234".to_string(),
            exp_month: 4,
            exp_year: 2027,
            verification_value: "123".to_string(),
        };
        assert_eq!(billing.last4(), "1234");
    }
}
