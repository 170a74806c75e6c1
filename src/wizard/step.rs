//! The step contract: one screen of a wizard flow.
//!
//! A step decides locally whether it should be skipped (`bypass`) and
//! whether forward navigation is allowed (`is_satisfied`); the
//! controller never inspects a step's fields. Failures stay local too:
//! a step that cannot advance keeps its own `form_error` for display.

use async_trait::async_trait;
use thiserror::Error;

use crate::client::{Attributes, ClientError};
use crate::components::form::Form;

use super::stage::Stage;
use super::WizardContext;

/// A step refused to advance/retreat. The message is for logs; the
/// user-visible text lives in the step's `form_error`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StepError {
    message: String,
}

impl StepError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ClientError> for StepError {
    fn from(err: ClientError) -> Self {
        Self::new(err.to_string())
    }
}

/// One page of a wizard flow
#[async_trait]
pub trait WizardStep: Send {
    /// The stage this step completes
    fn stage(&self) -> Stage;

    /// Completeness predicate: this stage's data is already present and
    /// valid in the shared wizard state
    fn is_complete(&self, ctx: &WizardContext) -> bool;

    /// Whether the step participates in the flow at all (e.g. the
    /// `web:promon.*` steps only apply to professionally monitored plans)
    fn applies(&self, _ctx: &WizardContext) -> bool {
        true
    }

    /// Skip this step? True when it does not apply, or when it was
    /// recorded complete AND its completeness predicate still holds.
    /// A recorded stage whose data went stale must be re-shown.
    fn bypass(&self, ctx: &WizardContext) -> bool {
        if !self.applies(ctx) {
            return true;
        }
        ctx.progress.is_complete(self.stage()) && self.is_complete(ctx)
    }

    /// Required inputs present/valid; gates `next()`
    fn is_satisfied(&self, ctx: &WizardContext) -> bool;

    /// When true, backward navigation lands here even if `bypass` is
    /// true, so a previously-visited, otherwise-hidden step stays
    /// reachable
    fn prev_ignores_bypass(&self) -> bool {
        false
    }

    /// Invoked when the step becomes current (either direction).
    /// Typically kicks off the remote fetch that feeds `is_satisfied`;
    /// fetched results must be applied under the context's activation
    /// lease so stale responses are discarded.
    async fn on_activate(&mut self, _ctx: &mut WizardContext) -> Result<(), StepError> {
        Ok(())
    }

    /// Perform the step's remote side effect and hand back the stage
    /// data for the progress recorder to merge. On error the cursor does
    /// not move and `form_error` carries the user-visible message.
    async fn on_next(&mut self, ctx: &mut WizardContext) -> Result<Attributes, StepError>;

    /// Side effect before moving backward off this step
    async fn on_prev(&mut self, _ctx: &mut WizardContext) -> Result<(), StepError> {
        Ok(())
    }

    /// The step's own user-visible failure message, if any
    fn form_error(&self) -> Option<&str> {
        None
    }

    /// Shown when `next()` is refused because the step is unsatisfied
    fn unsatisfied_hint(&self) -> &'static str {
        "Finish this step to continue."
    }

    /// Informational body paragraphs rendered above the form
    fn body(&self) -> Vec<String> {
        Vec::new()
    }

    /// The step's input form, if it has one
    fn form_mut(&mut self) -> Option<&mut Form> {
        None
    }
}
