//! Security questions & PIN step. Activation fetches the question
//! catalog; the step declares `prev_ignores_bypass` so backward
//! navigation can always land here even after it was completed.

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::client::{codes, Attributes};
use crate::components::form::{ChooserItem, Form, FormField};
use crate::services::SecurityQuestion;
use crate::wizard::stage::Stage;
use crate::wizard::step::{StepError, WizardStep};
use crate::wizard::WizardContext;

use super::{keys, notify_transition, stage_data, GENERIC_ERROR};

const QUESTION1_FIELD: &str = "First question";
const ANSWER1_FIELD: &str = "First answer";
const QUESTION2_FIELD: &str = "Second question";
const ANSWER2_FIELD: &str = "Second answer";
const PIN_FIELD: &str = "4-digit PIN";

pub struct SecurityQuestionsStep {
    catalog: Vec<SecurityQuestion>,
    form: Form,
    form_error: Option<String>,
}

impl SecurityQuestionsStep {
    pub fn new() -> Self {
        Self {
            catalog: Vec::new(),
            form: Form::new(vec![
                (QUESTION1_FIELD, FormField::chooser(Vec::new())),
                (ANSWER1_FIELD, FormField::text("")),
                (QUESTION2_FIELD, FormField::chooser(Vec::new())),
                (ANSWER2_FIELD, FormField::text("")),
                (PIN_FIELD, FormField::masked_digits(4)),
            ]),
            form_error: None,
        }
    }

    fn question_items(&self) -> Vec<ChooserItem> {
        self.catalog
            .iter()
            .map(|q| ChooserItem::new(q.question.clone(), ""))
            .collect()
    }

    fn selected_question(&self, field: &str) -> Option<&SecurityQuestion> {
        self.form
            .field(field)
            .and_then(FormField::selected_index)
            .and_then(|i| self.catalog.get(i))
    }

    fn questions_distinct(&self) -> bool {
        let q1 = self.form.field(QUESTION1_FIELD).and_then(FormField::selected_index);
        let q2 = self.form.field(QUESTION2_FIELD).and_then(FormField::selected_index);
        matches!((q1, q2), (Some(a), Some(b)) if a != b)
    }
}

impl Default for SecurityQuestionsStep {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WizardStep for SecurityQuestionsStep {
    fn stage(&self) -> Stage {
        Stage::SecurityQuestions
    }

    fn is_complete(&self, ctx: &WizardContext) -> bool {
        ctx.progress
            .get::<bool>(keys::SECURITY_COMPLETE)
            .unwrap_or(false)
    }

    fn is_satisfied(&self, _ctx: &WizardContext) -> bool {
        !self.catalog.is_empty()
            && self.questions_distinct()
            && !self.form.value(ANSWER1_FIELD).trim().is_empty()
            && !self.form.value(ANSWER2_FIELD).trim().is_empty()
            && self.form.value(PIN_FIELD).len() == 4
    }

    fn prev_ignores_bypass(&self) -> bool {
        true
    }

    async fn on_activate(&mut self, ctx: &mut WizardContext) -> Result<(), StepError> {
        self.form_error = None;
        if !self.catalog.is_empty() {
            return Ok(());
        }
        let lease = ctx.lease();
        let person = ctx.services.person(&ctx.identity.person_id);
        match person.list_security_questions().await {
            Ok(catalog) => {
                if !lease.is_current() {
                    debug!("discarding stale security question catalog");
                    return Ok(());
                }
                self.catalog = catalog;
                let items = self.question_items();
                if let Some(field) = self.form.field_mut(QUESTION1_FIELD) {
                    *field = FormField::chooser(items.clone());
                }
                if let Some(field) = self.form.field_mut(QUESTION2_FIELD) {
                    let mut chooser = FormField::chooser(items);
                    chooser.select_index(1);
                    *field = chooser;
                }
                Ok(())
            }
            Err(e) => {
                self.form_error = Some("Couldn't load the security questions.".to_string());
                Err(e.into())
            }
        }
    }

    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError> {
        let pairs: Vec<(String, String)> = [
            (QUESTION1_FIELD, ANSWER1_FIELD),
            (QUESTION2_FIELD, ANSWER2_FIELD),
        ]
        .iter()
        .filter_map(|(q, a)| {
            self.selected_question(q)
                .map(|question| (question.id.clone(), self.form.value(a).trim().to_string()))
        })
        .collect();

        let person = ctx.services.person(&ctx.identity.person_id);
        if let Err(e) = person.set_security_answers(&pairs).await {
            self.form_error = Some(GENERIC_ERROR.to_string());
            return Err(e.into());
        }

        let pin = self.form.value(PIN_FIELD);
        match person.change_pin(&ctx.identity.place_id, &pin).await {
            Ok(()) => {
                self.form_error = None;
                notify_transition(ctx, Stage::SecurityQuestions).await;
                Ok(stage_data(&[(keys::SECURITY_COMPLETE, json!(true))]))
            }
            Err(e) if e.is_code(codes::PIN_NOT_UNIQUE_AT_PLACE) => {
                self.form_error =
                    Some("Someone at this place already uses that PIN.".to_string());
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
        "Pick two different questions, answer both, and choose a 4-digit PIN."
    }

    fn body(&self) -> Vec<String> {
        vec![
            "Security questions verify your identity when you call support.".to_string(),
            "Your PIN disarms the alarm at the keypad.".to_string(),
        ]
    }

    fn form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }
}
