//! Home address step: street address, prefilled from the ZIP lookup

use async_trait::async_trait;
use serde_json::json;

use crate::client::{codes, Attributes};
use crate::components::form::{Form, FormField};
use crate::services::AddressQuery;
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, stage_data, GENERIC_ERROR};

const STREET_FIELD: &str = "Street address";
const CITY_FIELD: &str = "City";
const STATE_FIELD: &str = "State";

pub struct AddressStep {
    form: Form,
    form_error: Option<String>,
}

impl AddressStep {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![
                (STREET_FIELD, FormField::text("123 Main St")),
                (CITY_FIELD, FormField::text("")),
                (STATE_FIELD, FormField::text_with_max("OR", 2)),
            ]),
            form_error: None,
        }
    }

    fn query(&self, ctx: &WizardContext) -> AddressQuery {
        AddressQuery {
            street: self.form.value(STREET_FIELD).trim().to_string(),
            city: self.form.value(CITY_FIELD).trim().to_string(),
            state: self.form.value(STATE_FIELD).trim().to_uppercase(),
            zipcode: ctx.progress.get_str(keys::ZIPCODE).unwrap_or("").to_string(),
        }
    }
}

impl Default for AddressStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for AddressStep {
    fn stage(&self) -> Stage {
        Stage::Address
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::ADDRESS_VALID)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        !self.form.value(STREET_FIELD).trim().is_empty()
            && !self.form.value(CITY_FIELD).trim().is_empty()
            && self.form.value(STATE_FIELD).trim().len() == 2
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        // Prefill city/state from the ZIP lookup the previous step recorded
        for (field, key) in [
            (CITY_FIELD, keys::CITY),
            (STATE_FIELD, keys::STATE),
            (STREET_FIELD, keys::STREET),
        ] {
            if self.form.value(field).is_empty() {
                if let Some(value) = ctx.progress.get_str(key) {
                    let value = value.to_string();
                    if let Some(f) = self.form.field_mut(field) {
                        f.set_text(&value);
                    }
                }
            }
        }
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let query = self.query(ctx);
        match ctx.services.places().validate_address(&query).await {
            Ok(check) if check.valid => {
                self.form_error = None;
                notify_transition(ctx, Stage::Address).await;
                Ok(stage_data(&[
                    (keys::STREET, json!(query.street)),
                    (keys::CITY, json!(query.city)),
                    (keys::STATE, json!(query.state)),
                    (keys::ADDRESS_VALID, json!(true)),
                ]))
            }
            Ok(check) => {
                self.form_error = Some(match check.suggestions.first() {
                    Some(suggestion) => {
                        format!("We couldn't verify that address. Did you mean {suggestion}?")
                    }
                    None => "We couldn't verify that address.".to_string(),
                });
                Err(StepError::new("address failed verification"))
            }
            Err(e) if e.is_code(codes::ADDRESS_UNVERIFIED) => {
                self.form_error = Some("We couldn't verify that address.".to_string());
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
        "Fill in the street, city, and two-letter state."
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
