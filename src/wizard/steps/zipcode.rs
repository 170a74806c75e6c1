//! ZIP code step: the first thing signup asks for

use async_trait::async_trait;
use serde_json::json;

use crate::client::{codes, Attributes};
use crate::components::form::{Form, FormField};
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, stage_data, GENERIC_ERROR};

const ZIP_FIELD: &str = "ZIP code";

pub struct ZipcodeStep {
    form: Form,
    form_error: Option<String>,
}

impl ZipcodeStep {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![(ZIP_FIELD, FormField::digits(5))]),
            form_error: None,
        }
    }

    fn zip(&self) -> String {
        self.form.value(ZIP_FIELD)
    }
}

impl Default for ZipcodeStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for ZipcodeStep {
    fn stage(&self) -> Stage {
        Stage::Zipcode
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get_str(keys::ZIPCODE)
            .map(|z| z.len() == 5)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        self.zip().len() == 5
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        if self.zip().is_empty() {
            if let Some(zip) = ctx.progress.get_str(keys::ZIPCODE) {
                let zip = zip.to_string();
                if let Some(field) = self.form.field_mut(ZIP_FIELD) {
                    field.set_text(&zip);
                }
            }
        }
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let zip = self.zip();
        match ctx.services.places().lookup_zipcode(&zip).await {
            Ok(info) => {
                self.form_error = None;
                notify_transition(ctx, Stage::Zipcode).await;
                Ok(stage_data(&[
                    (keys::ZIPCODE, json!(zip)),
                    (keys::CITY, json!(info.city)),
                    (keys::STATE, json!(info.state)),
                ]))
            }
            Err(e) if e.is_code(codes::ZIP_UNRECOGNIZED) => {
                self.form_error = Some("We don't recognize that ZIP code.".to_string());
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
        "Enter the 5-digit ZIP code for your home."
    }

    fn body(&self) -> Vec<String> {
        vec!["Your ZIP code tells us which services are available at your home.".to_string()]
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
