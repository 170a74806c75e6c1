//! Wizard engine: stage registry, step contract, progress recorder, and
//! the skip-aware controller that walks them.
//!
//! The controller owns an ordered list of steps and a cursor. Forward
//! motion asks the current step to satisfy itself, runs its side effect,
//! records progress, then skips over any step whose `bypass` holds.
//! Backward motion is symmetric, undoes the landed stage's progress, and
//! honors `prev_ignores_bypass`.

pub mod progress;
pub mod stage;
pub mod step;
pub mod steps;

pub use progress::ProgressRecorder;
pub use stage::{Stage, SIGNUP_STAGES};
pub use step::{StepError, WizardStep};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::services::Services;

/// Ids the signup flow acts on behalf of
#[derive(Debug, Clone)]
pub struct WizardIdentity {
    pub person_id: String,
    pub account_id: String,
    pub place_id: String,
}

/// Issues activation leases; bumping the epoch invalidates every lease
/// issued before it
#[derive(Debug, Clone, Default)]
pub struct ActivationEpoch(Arc<AtomicU64>);

impl ActivationEpoch {
    pub fn issue(&self) -> ActivationLease {
        let id = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        ActivationLease {
            epoch: Arc::clone(&self.0),
            id,
        }
    }
}

/// Proof that a fetch belongs to the current step activation. A fetch
/// started under an older activation fails `is_current` and its result
/// must be discarded instead of applied to shared state.
#[derive(Debug, Clone)]
pub struct ActivationLease {
    epoch: Arc<AtomicU64>,
    id: u64,
}

impl ActivationLease {
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.id
    }
}

/// Everything a step may touch: services, identity, shared progress,
/// and the activation lease guarding fetched writes
pub struct WizardContext {
    pub services: Services,
    pub identity: WizardIdentity,
    pub progress: ProgressRecorder,
    epoch: ActivationEpoch,
    lease: ActivationLease,
}

impl WizardContext {
    pub fn new(services: Services, identity: WizardIdentity, progress: ProgressRecorder) -> Self {
        let epoch = ActivationEpoch::default();
        let lease = epoch.issue();
        Self {
            services,
            identity,
            progress,
            epoch,
            lease,
        }
    }

    /// The lease for the current activation
    pub fn lease(&self) -> ActivationLease {
        self.lease.clone()
    }

    fn renew_lease(&mut self) {
        self.lease = self.epoch.issue();
    }
}

/// Outcome of `WizardController::next`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    /// Moved to a later step
    Advanced,
    /// Refused: the current step is not satisfied
    NotSatisfied,
    /// The step's side effect failed; cursor unchanged, the step holds
    /// its own error message
    Failed,
    /// The registry is exhausted; the flow is done
    Complete,
}

/// Outcome of `WizardController::prev`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevOutcome {
    /// Moved to an earlier step
    MovedBack,
    /// Nothing before the cursor to land on
    AtStart,
    /// The step's `on_prev` failed; cursor unchanged
    Failed,
}

/// Display status of a stage, for progress breadcrumbs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Current,
    Done,
    Bypassed,
    Pending,
}

/// Walks an ordered list of steps with skip-aware navigation
pub struct WizardController {
    steps: Vec<Box<dyn WizardStep>>,
    cursor: usize,
    complete: bool,
    ctx: WizardContext,
}

impl WizardController {
    pub fn new(steps: Vec<Box<dyn WizardStep>>, ctx: WizardContext) -> Self {
        Self {
            steps,
            cursor: 0,
            complete: false,
            ctx,
        }
    }

    /// Position the cursor on the first non-bypassed step and activate
    /// it. A fully-bypassed registry (resumed, everything recorded)
    /// completes immediately.
    pub async fn start(&mut self) {
        let mut first = 0;
        while first < self.steps.len() && self.steps[first].bypass(&self.ctx) {
            debug!(
                stage = self.steps[first].stage().key(),
                "skipping bypassed step"
            );
            first += 1;
        }
        if first >= self.steps.len() {
            self.complete = true;
            return;
        }
        self.cursor = first;
        self.activate_current().await;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// The current step, unless the flow already completed
    pub fn current(&self) -> Option<&dyn WizardStep> {
        if self.complete {
            None
        } else {
            self.steps.get(self.cursor).map(AsRef::as_ref)
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut Box<dyn WizardStep>> {
        if self.complete {
            None
        } else {
            self.steps.get_mut(self.cursor)
        }
    }

    pub fn ctx(&self) -> &WizardContext {
        &self.ctx
    }

    pub fn progress(&self) -> &ProgressRecorder {
        &self.ctx.progress
    }

    /// Per-stage display status, in registry order
    pub fn overview(&self) -> Vec<(Stage, StageStatus)> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let stage = step.stage();
                let status = if !self.complete && i == self.cursor {
                    StageStatus::Current
                } else if self.ctx.progress.is_complete(stage) {
                    StageStatus::Done
                } else if step.bypass(&self.ctx) {
                    StageStatus::Bypassed
                } else {
                    StageStatus::Pending
                };
                (stage, status)
            })
            .collect()
    }

    /// Advance past the current step if it allows it
    pub async fn next(&mut self) -> NextOutcome {
        if self.complete {
            return NextOutcome::Complete;
        }
        if !self.steps[self.cursor].is_satisfied(&self.ctx) {
            return NextOutcome::NotSatisfied;
        }

        let stage = self.steps[self.cursor].stage();
        match self.steps[self.cursor].on_next(&mut self.ctx).await {
            Ok(data) => {
                if let Err(e) = self.ctx.progress.record_progress(stage, data) {
                    warn!(stage = stage.key(), error = %e, "failed to persist progress");
                }
                let mut next = self.cursor + 1;
                while next < self.steps.len() && self.steps[next].bypass(&self.ctx) {
                    debug!(
                        stage = self.steps[next].stage().key(),
                        "skipping bypassed step"
                    );
                    next += 1;
                }
                if next >= self.steps.len() {
                    self.complete = true;
                    NextOutcome::Complete
                } else {
                    self.cursor = next;
                    self.activate_current().await;
                    NextOutcome::Advanced
                }
            }
            Err(e) => {
                warn!(stage = stage.key(), error = %e, "step refused to advance");
                NextOutcome::Failed
            }
        }
    }

    /// Move backward, honoring `prev_ignores_bypass`. Every stage the
    /// cursor passes has its progress undone, so a step the user
    /// returns to is not silently bypassed; steps that still bypass
    /// after the undo (inapplicable ones) are skipped over.
    pub async fn prev(&mut self) -> PrevOutcome {
        if self.complete || self.cursor == 0 {
            return PrevOutcome::AtStart;
        }

        let stage = self.steps[self.cursor].stage();
        if let Err(e) = self.steps[self.cursor].on_prev(&mut self.ctx).await {
            warn!(stage = stage.key(), error = %e, "step refused to retreat");
            return PrevOutcome::Failed;
        }

        let mut landing = None;
        let mut candidate = self.cursor;
        while candidate > 0 {
            candidate -= 1;
            let passed = self.steps[candidate].stage();
            if let Err(e) = self.ctx.progress.undo_progress(passed) {
                warn!(stage = passed.key(), error = %e, "failed to undo progress");
            }
            let step = &self.steps[candidate];
            if step.prev_ignores_bypass() || !step.bypass(&self.ctx) {
                landing = Some(candidate);
                break;
            }
        }
        let Some(landing) = landing else {
            return PrevOutcome::AtStart;
        };

        self.cursor = landing;
        self.activate_current().await;
        PrevOutcome::MovedBack
    }

    async fn activate_current(&mut self) {
        self.ctx.renew_lease();
        let stage = self.steps[self.cursor].stage();
        debug!(stage = stage.key(), "activating step");
        if let Err(e) = self.steps[self.cursor].on_activate(&mut self.ctx).await {
            warn!(stage = stage.key(), error = %e, "step activation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lease_goes_stale_when_epoch_advances() {
        let epoch = ActivationEpoch::default();
        let first = epoch.issue();
        assert!(first.is_current());

        let second = epoch.issue();
        assert!(!first.is_current());
        assert!(second.is_current());
    }
}
