//! Service plan step. Activation fetches pro-monitoring availability for
//! the entered ZIP; a NONE answer disables the monitored plan. The fetch
//! result is applied under the activation lease, so an answer arriving
//! after the user has navigated elsewhere is discarded.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::Attributes;
use crate::components::form::{ChooserItem, Form, FormField};
use crate::services::{PlanLevel, PromonAvailability};
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, selected_plan, stage_data, GENERIC_ERROR};

const PLAN_FIELD: &str = "Plan";

pub struct PlanStep {
    form: Form,
    availability: Option<PromonAvailability>,
    form_error: Option<String>,
}

impl PlanStep {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![(PLAN_FIELD, Self::chooser(None))]),
            availability: None,
            form_error: None,
        }
    }

    fn chooser(availability: Option<PromonAvailability>) -> FormField {
        let promon_offered = availability.map_or(true, PromonAvailability::is_available);
        let items = PlanLevel::all()
            .iter()
            .map(|plan| {
                let item = ChooserItem::new(plan.label(), plan.description());
                if plan.is_promon() && !promon_offered {
                    item.disabled()
                } else {
                    item
                }
            })
            .collect();
        FormField::chooser(items)
    }

    fn selection(&self) -> Option<PlanLevel> {
        self.form
            .field(PLAN_FIELD)
            .and_then(FormField::selected_index)
            .and_then(|i| PlanLevel::all().get(i).copied())
    }

    fn apply_availability(&mut self, availability: PromonAvailability) {
        let previous = self
            .form
            .field(PLAN_FIELD)
            .and_then(FormField::selected_index)
            .unwrap_or(0);
        self.availability = Some(availability);
        if let Some(field) = self.form.field_mut(PLAN_FIELD) {
            *field = Self::chooser(Some(availability));
            field.select_index(previous);
        }
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for PlanStep {
    fn stage(&self) -> Stage {
        Stage::Plan
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        selected_plan(ctx).is_some()
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        self.selection().is_some()
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;

        if let Some(plan) = selected_plan(ctx) {
            if let Some(idx) = PlanLevel::all().iter().position(|p| *p == plan) {
                if let Some(field) = self.form.field_mut(PLAN_FIELD) {
                    field.select_index(idx);
                }
            }
        }

        if self.availability.is_none() {
            let zip = ctx.progress.get_str(keys::ZIPCODE).unwrap_or("").to_string();
            let state = ctx.progress.get_str(keys::STATE).unwrap_or("").to_string();
            let lease = ctx.lease();
            match ctx
                .services
                .promonitoring()
                .check_availability(&zip, &state)
                .await
            {
                Ok(availability) => {
                    if lease.is_current() {
                        self.apply_availability(availability);
                    } else {
                        debug!("discarding stale availability answer");
                    }
                }
                // Monitored plan stays selectable; the platform rejects
                // it at purchase time if truly unavailable
                Err(e) => warn!(error = %e, "availability check failed"),
            }
        }
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let Some(plan) = self.selection() else {
            return Err(StepError::new("no plan selected"));
        };
        match ctx
            .services
            .account(&ctx.identity.account_id)
            .update_service_plan(plan)
            .await
        {
            Ok(()) => {
                self.form_error = None;
                notify_transition(ctx, Stage::Plan).await;
                Ok(stage_data(&[(keys::PLAN, json!(plan.key()))]))
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

    fn body(&self) -> Vec<String> {
        let mut lines = vec!["Pick the service level for this home.".to_string()];
        if self.availability == Some(PromonAvailability::None) {
            lines.push(
                "Professional monitoring isn't offered at your address yet.".to_string(),
            );
        }
        lines
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
