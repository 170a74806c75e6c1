//! Professional monitoring signup steps. All three only apply when the
//! selected plan is professionally monitored; choosing a different plan
//! bypasses them even if they were completed on an earlier pass.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};

use crate::client::http::StaticDocument;
use crate::client::Attributes;
use crate::components::form::{Form, FormField};
use crate::services::PromonSettings;
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, selected_plan, stage_data, GENERIC_ERROR};

fn plan_is_promon(ctx: &WizardContext) -> bool {
    selected_plan(ctx).map(|p| p.is_promon()).unwrap_or(false)
}

// ─── Monitoring information ─────────────────────────────────────────────────

const ACK_FIELD: &str = "I understand how monitoring works";

pub struct PromonInfoStep {
    document: Option<StaticDocument>,
    form: Form,
    form_error: Option<String>,
}

impl PromonInfoStep {
    pub fn new() -> Self {
        Self {
            document: None,
            form: Form::new(vec![(ACK_FIELD, FormField::toggle("Yes", "Not yet"))]),
            form_error: None,
        }
    }
}

impl Default for PromonInfoStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for PromonInfoStep {
    fn stage(&self) -> Stage {
        Stage::PromonInfo
    }

    fn applies(&self, ctx: &WizardContext) -> bool {
        plan_is_promon(ctx)
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::PROMON_INFO_ACKNOWLEDGED)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        self.form.field(ACK_FIELD).map(FormField::is_on).unwrap_or(false)
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        if self.document.is_some() {
            return Ok(());
        }
        let lease = ctx.lease();
        match ctx.services.resources().promon_info().await {
            Ok(document) => {
                if lease.is_current() {
                    self.document = Some(document);
                } else {
                    debug!("discarding stale monitoring document");
                }
            }
            // The built-in summary text stands in when the CDN is
            // unreachable; acknowledgement still works
            Err(e) => warn!(error = %e, "monitoring info document unavailable"),
        }
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        notify_transition(ctx, Stage::PromonInfo).await;
        Ok(stage_data(&[(keys::PROMON_INFO_ACKNOWLEDGED, json!(true))]))
    }

    fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    fn unsatisfied_hint(&self) -> &'static str {
        "Confirm you've read how monitoring works."
    }

    fn body(&self) -> Vec<String> {
        match &self.document {
            Some(doc) => {
                let mut lines = vec![doc.title.clone()];
                lines.extend(doc.paragraphs.iter().cloned());
                lines
            }
            None => vec![
                "When an alarm triggers, the monitoring station calls you first."
                    .to_string(),
                "If you don't answer or give the wrong PIN, they dispatch responders."
                    .to_string(),
            ],
        }
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}

// ─── Alarm permit ───────────────────────────────────────────────────────────

const PERMIT_FIELD: &str = "Permit number";

pub struct PromonPermitStep {
    settings: Option<PromonSettings>,
    form: Form,
    form_error: Option<String>,
}

impl PromonPermitStep {
    pub fn new() -> Self {
        Self {
            settings: None,
            form: Form::new(vec![(
                PERMIT_FIELD,
                FormField::text("Leave blank if you don't have one"),
            )]),
            form_error: None,
        }
    }

    fn permit(&self) -> String {
        self.form.value(PERMIT_FIELD).trim().to_string()
    }

    fn permit_required(&self) -> bool {
        self.settings.as_ref().map(|s| s.permit_required).unwrap_or(false)
    }
}

impl Default for PromonPermitStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for PromonPermitStep {
    fn stage(&self) -> Stage {
        Stage::PromonPermit
    }

    fn applies(&self, ctx: &WizardContext) -> bool {
        plan_is_promon(ctx)
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::PROMON_PERMIT_RECORDED)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        !self.permit_required() || !self.permit().is_empty()
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        if self.permit().is_empty() {
            if let Some(permit) = ctx.progress.get_str(keys::PROMON_PERMIT) {
                let permit = permit.to_string();
                if let Some(field) = self.form.field_mut(PERMIT_FIELD) {
                    field.set_text(&permit);
                }
            }
        }
        if self.settings.is_none() {
            let lease = ctx.lease();
            let place_id = ctx.identity.place_id.clone();
            match ctx.services.promonitoring().get_settings(&place_id).await {
                Ok(settings) => {
                    if lease.is_current() {
                        self.settings = Some(settings);
                    } else {
                        debug!("discarding stale monitoring settings");
                    }
                }
                Err(e) => warn!(error = %e, "monitoring settings unavailable"),
            }
        }
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let permit = self.permit();
        if !permit.is_empty() {
            if let Err(e) = ctx
                .services
                .promonitoring()
                .update_permit(&ctx.identity.place_id, &permit)
                .await
            {
                self.form_error = Some(GENERIC_ERROR.to_string());
                return Err(e.into());
            }
        }
        self.form_error = None;
        notify_transition(ctx, Stage::PromonPermit).await;
        Ok(stage_data(&[
            (keys::PROMON_PERMIT_RECORDED, json!(true)),
            (keys::PROMON_PERMIT, json!(permit)),
        ]))
    }

    fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    fn unsatisfied_hint(&self) -> &'static str {
        "Your jurisdiction requires an alarm permit number."
    }

    fn body(&self) -> Vec<String> {
        let mut lines =
            vec!["Some cities require a permit before responders can be dispatched.".to_string()];
        if self.permit_required() {
            lines.push("Your jurisdiction requires one; enter the number below.".to_string());
        }
        lines
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}

// ─── Monitoring-station test call ───────────────────────────────────────────

const READY_FIELD: &str = "Ready to place the test call";

pub struct PromonTestCallStep {
    form: Form,
    form_error: Option<String>,
}

impl PromonTestCallStep {
    pub fn new() -> Self {
        Self {
            form: Form::new(vec![(READY_FIELD, FormField::toggle("Ready", "Not yet"))]),
            form_error: None,
        }
    }
}

impl Default for PromonTestCallStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for PromonTestCallStep {
    fn stage(&self) -> Stage {
        Stage::PromonTestCall
    }

    fn applies(&self, ctx: &WizardContext) -> bool {
        plan_is_promon(ctx)
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::PROMON_TEST_CALL_DONE)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        self.form
            .field(READY_FIELD)
            .map(FormField::is_on)
            .unwrap_or(false)
    }

    async fn on_activate(&mut self, _ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        Ok(())
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        match ctx
            .services
            .promonitoring()
            .complete_test_call(&ctx.identity.place_id)
            .await
        {
            Ok(()) => {
                self.form_error = None;
                notify_transition(ctx, Stage::PromonTestCall).await;
                Ok(stage_data(&[(keys::PROMON_TEST_CALL_DONE, json!(true))]))
            }
            Err(e) => {
                self.form_error =
                    Some("The test call didn't go through. Try again.".to_string());
                Err(e.into())
            }
        }
    }

    fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    fn unsatisfied_hint(&self) -> &'static str {
        "Flip to Ready when you can take the call."
    }

    fn body(&self) -> Vec<String> {
        vec![
            "The monitoring station places a test call to confirm they can reach you."
                .to_string(),
            "Keep your phone nearby; the call arrives within a few minutes.".to_string(),
        ]
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
