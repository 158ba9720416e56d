use crate::error::ReclaimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    ContentsOfDirectory,
    WholeDirectory,
    ExternalCommand,
}

impl TargetKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContentsOfDirectory => "Directory Contents",
            Self::WholeDirectory => "Whole Directory",
            Self::ExternalCommand => "External Command",
        }
    }

    /// Freed space for these targets is measured as a filesystem-wide delta.
    pub const fn is_delta_measured(self) -> bool {
        matches!(self, Self::ExternalCommand)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Real,
    Simulate,
}

/// Point-in-time view of one filesystem. Take a new one to observe changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsageSnapshot {
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    pub free_percent: f64,
}

impl DiskUsageSnapshot {
    pub fn new(total_bytes: u64, free_bytes: u64) -> Self {
        let free_bytes = free_bytes.min(total_bytes);
        let free_percent = if total_bytes > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                (free_bytes as f64 / total_bytes as f64) * 100.0
            }
        } else {
            0.0
        };

        Self {
            total_bytes,
            free_bytes,
            used_bytes: total_bytes - free_bytes,
            free_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReclaimOutcome {
    pub target: String,
    pub kind: TargetKind,
    pub attempted: bool,
    pub succeeded: bool,
    pub bytes_freed: u64,
    pub approximate: bool,
    pub error: Option<String>,
}

impl ReclaimOutcome {
    pub fn from_estimate(target: &str, kind: TargetKind, result: Result<u64, ReclaimError>) -> Self {
        match result {
            Ok(bytes) => Self {
                target: target.to_string(),
                kind,
                attempted: false,
                succeeded: true,
                bytes_freed: bytes,
                approximate: false,
                error: None,
            },
            Err(err) => Self::failed(target, kind, false, &err),
        }
    }

    pub fn from_reclaim(target: &str, kind: TargetKind, result: Result<u64, ReclaimError>) -> Self {
        match result {
            Ok(bytes) => Self {
                target: target.to_string(),
                kind,
                attempted: true,
                succeeded: true,
                bytes_freed: bytes,
                approximate: kind.is_delta_measured(),
                error: None,
            },
            Err(err) if err.is_benign() => Self {
                target: target.to_string(),
                kind,
                attempted: false,
                succeeded: true,
                bytes_freed: 0,
                approximate: false,
                error: None,
            },
            Err(err) => Self::failed(target, kind, true, &err),
        }
    }

    fn failed(target: &str, kind: TargetKind, attempted: bool, err: &ReclaimError) -> Self {
        Self {
            target: target.to_string(),
            kind,
            attempted,
            succeeded: false,
            bytes_freed: err.credited_bytes(),
            approximate: attempted && kind.is_delta_measured(),
            error: Some(err.to_string()),
        }
    }
}

/// Terminal state reached by one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Skipped,
    Cancelled,
    Summarized,
}

#[derive(Debug, Clone)]
pub struct CleanupRun {
    pub phase: RunPhase,
    pub mode: RunMode,
    pub threshold_percent: f64,
    pub forced: bool,
    pub snapshot_before: DiskUsageSnapshot,
    pub snapshot_after: Option<DiskUsageSnapshot>,
    pub outcomes: Vec<ReclaimOutcome>,
    pub total_bytes: u64,
}

impl CleanupRun {
    pub const fn is_estimate(&self) -> bool {
        matches!(self.mode, RunMode::Simulate)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReclaimOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}
