//! Threshold-gated cleanup run.
//!
//! ```text
//! IDLE -> EVALUATING -> SKIPPED
//!                    -> CONFIRMING -> CANCELLED
//!                                  -> EXECUTING -> SUMMARIZED
//! ```
//!
//! [`CleanupOrchestrator::evaluate`] covers EVALUATING. The caller asks the
//! user when [`CleanupOrchestrator::requires_confirmation`] says so and hands
//! the answer to [`CleanupOrchestrator::execute`]. Nothing here reads input.

use crate::disk::{UsageSource, needs_cleanup};
use crate::error::{CleanupError, ReclaimError};
use crate::model::{
    CleanupRun, DiskUsageSnapshot, ReclaimOutcome, RunMode, RunPhase, TargetKind,
};
use crate::targets::ReclaimTarget;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleanupOptions {
    pub threshold_percent: f64,
    pub force: bool,
    pub mode: RunMode,
    pub auto_confirm: bool,
}

/// Result of EVALUATING.
#[derive(Debug)]
pub enum Evaluation {
    Skip(CleanupRun),
    Proceed(PendingRun),
}

/// A run that passed the threshold gate and waits for confirmation.
#[derive(Debug)]
pub struct PendingRun {
    pub snapshot_before: DiskUsageSnapshot,
}

pub struct CleanupOrchestrator<M: UsageSource> {
    monitor: M,
    measured_path: PathBuf,
    targets: Vec<Box<dyn ReclaimTarget>>,
    options: CleanupOptions,
}

impl<M: UsageSource> CleanupOrchestrator<M> {
    pub fn new(
        monitor: M,
        measured_path: PathBuf,
        targets: Vec<Box<dyn ReclaimTarget>>,
        options: CleanupOptions,
    ) -> Self {
        Self {
            monitor,
            measured_path,
            targets,
            options,
        }
    }

    pub const fn options(&self) -> &CleanupOptions {
        &self.options
    }

    pub fn requires_confirmation(&self) -> bool {
        !self.options.auto_confirm
    }

    /// What EXECUTING would do, in order.
    pub fn planned_actions(&self) -> Vec<String> {
        self.targets.iter().map(|t| t.describe()).collect()
    }

    pub fn evaluate(&self) -> Result<Evaluation, CleanupError> {
        debug!("evaluating {}", self.measured_path.display());
        let snapshot = self.monitor.snapshot(&self.measured_path)?;

        if needs_cleanup(
            &snapshot,
            self.options.threshold_percent,
            self.options.force,
        ) {
            debug!(
                free_percent = snapshot.free_percent,
                forced = self.options.force,
                "cleanup needed"
            );
            Ok(Evaluation::Proceed(PendingRun {
                snapshot_before: snapshot,
            }))
        } else {
            info!(
                free_percent = snapshot.free_percent,
                threshold = self.options.threshold_percent,
                "no action needed"
            );
            Ok(Evaluation::Skip(self.finish(
                RunPhase::Skipped,
                snapshot,
                None,
                Vec::new(),
            )))
        }
    }

    /// CONFIRMING and EXECUTING. `confirmed` is the caller's answer and is
    /// ignored when auto-confirm is on. `progress_cb` gets each target's id
    /// and kind right before it runs.
    pub fn execute(
        &self,
        pending: PendingRun,
        confirmed: bool,
        progress_cb: Option<&dyn Fn(&str, TargetKind)>,
    ) -> CleanupRun {
        if self.requires_confirmation() && !confirmed {
            info!("cleanup cancelled");
            return self.finish(
                RunPhase::Cancelled,
                pending.snapshot_before,
                None,
                Vec::new(),
            );
        }

        debug!(mode = ?self.options.mode, targets = self.targets.len(), "executing");
        let outcomes: Vec<ReclaimOutcome> = self
            .targets
            .iter()
            .map(|target| {
                if let Some(cb) = progress_cb {
                    cb(target.id(), target.kind());
                }
                self.run_target(target.as_ref())
            })
            .collect();

        let snapshot_after = match self.options.mode {
            RunMode::Simulate => None,
            RunMode::Real => match self.monitor.snapshot(&self.measured_path) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!("could not re-read disk usage: {e}");
                    None
                }
            },
        };

        self.finish(
            RunPhase::Summarized,
            pending.snapshot_before,
            snapshot_after,
            outcomes,
        )
    }

    fn run_target(&self, target: &dyn ReclaimTarget) -> ReclaimOutcome {
        let mode = self.options.mode;
        let result = panic::catch_unwind(AssertUnwindSafe(|| match mode {
            RunMode::Simulate => target.estimate(),
            RunMode::Real => target.reclaim(),
        }))
        .unwrap_or_else(|payload| Err(ReclaimError::Panicked(panic_message(payload.as_ref()))));

        if let Err(e) = &result {
            if e.is_benign() {
                info!("{}: {e}, nothing to do", target.id());
            } else {
                warn!("{}: {e}", target.id());
            }
        }

        let outcome = match mode {
            RunMode::Simulate => ReclaimOutcome::from_estimate(target.id(), target.kind(), result),
            RunMode::Real => ReclaimOutcome::from_reclaim(target.id(), target.kind(), result),
        };
        debug!(
            id = %outcome.target,
            kind = outcome.kind.name(),
            bytes = outcome.bytes_freed,
            succeeded = outcome.succeeded,
            "target done"
        );
        outcome
    }

    fn finish(
        &self,
        phase: RunPhase,
        snapshot_before: DiskUsageSnapshot,
        snapshot_after: Option<DiskUsageSnapshot>,
        outcomes: Vec<ReclaimOutcome>,
    ) -> CleanupRun {
        let total_bytes = outcomes.iter().map(|o| o.bytes_freed).sum();
        CleanupRun {
            phase,
            mode: self.options.mode,
            threshold_percent: self.options.threshold_percent,
            forced: self.options.force,
            snapshot_before,
            snapshot_after,
            outcomes,
            total_bytes,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
