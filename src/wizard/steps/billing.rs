//! Billing step: card details, submitted to the platform and never
//! persisted locally. The progress file only ever sees the last four
//! digits.

use async_trait::async_trait;
use serde_json::json;

use crate::client::{codes, Attributes};
use crate::components::form::{Form, FormField};
use crate::services::BillingInfo;
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, stage_data, GENERIC_ERROR};

const NAME_FIELD: &str = "Name on card";
const NUMBER_FIELD: &str = "Card number";
const MONTH_FIELD: &str = "Expiration month";
const YEAR_FIELD: &str = "Expiration year";
const CVV_FIELD: &str = "CVV";

pub struct BillingStep {
    form: Form,
    form_error: Option<String>,
}

impl BillingStep {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                (NAME_FIELD, FormField::text("As printed on the card")),
                (NUMBER_FIELD, FormField::digits(19)),
                (MONTH_FIELD, FormField::digits(2)),
                (YEAR_FIELD, FormField::digits(4)),
                (CVV_FIELD, FormField::masked_digits(4)),
            ]),
            form_error: None,
        }
    }

    fn billing_info(&self) -> Option<BillingInfo> {
        let exp_month: u8 = self.form.value(MONTH_FIELD).parse().ok()?;
        let exp_year: u16 = self.form.value(YEAR_FIELD).parse().ok()?;
        Some(BillingInfo {
            name_on_card: self.form.value(NAME_FIELD).trim().to_string(),
            number: self.form.value(NUMBER_FIELD),
            exp_month,
            exp_year,
            verification_value: self.form.value(CVV_FIELD),
        })
    }
}

impl Default for BillingStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for BillingStep {
    fn stage(&self) -> Stage {
        Stage::Billing
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::BILLING_COMPLETE)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        let month_ok = self
            .form
            .value(MONTH_FIELD)
            .parse::<u8>()
            .map(|m| (1..=12).contains(&m))
            .unwrap_or(false);
        !self.form.value(NAME_FIELD).trim().is_empty()
            && self.form.value(NUMBER_FIELD).len() >= 13
            && month_ok
            && self.form.value(YEAR_FIELD).len() == 4
            && self.form.value(CVV_FIELD).len() >= 3
    }

    async fn on_activate(&mut self, _ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let Some(billing) = self.billing_info() else {
            return Err(StepError::new("billing fields incomplete"));
        };
        match ctx
            .services
            .account(&ctx.identity.account_id)
            .update_billing_info(&billing)
            .await
        {
            Ok(()) => {
                self.form_error = None;
                notify_transition(ctx, Stage::Billing).await;
                Ok(stage_data(&[
                    (keys::BILLING_COMPLETE, json!(true)),
                    (keys::BILLING_LAST4, json!(billing.last4())),
                ]))
            }
            Err(e) if e.is_code(codes::CARD_DECLINED) => {
                self.form_error = Some("Your card was declined.".to_string());
                Err(e.into())
            }
            Err(e) if e.is_code(codes::CARD_INVALID) => {
                self.form_error = Some("That card number doesn't look right.".to_string());
                Err(e.into())
            }
            Err(e) => {
                self.form_error = Some(GENERIC_ERROR.to_string());
                Err(e.into())
            }
        }
    }

    fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    fn unsatisfied_hint(&self) -> &'static str {
        "Fill in the card details before continuing."
    }

    fn body(&self) -> Vec<String> {
        vec!["You won't be charged until your trial ends.".to_string()]
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
