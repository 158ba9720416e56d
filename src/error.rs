use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single reclaim target. Caught at the target boundary and
/// turned into a `ReclaimOutcome`; never aborts the run.
#[derive(Debug, Error)]
pub enum ReclaimError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{failed} of {attempted} entries could not be removed (first: {first})")]
    PartialFailure {
        freed: u64,
        failed: usize,
        attempted: usize,
        first: String,
    },

    #[error("`{command}` failed: {reason}")]
    ExternalActionFailed {
        command: String,
        reason: String,
        freed: u64,
    },

    #[error("failed to remove {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("target panicked: {0}")]
    Panicked(String),
}

impl ReclaimError {
    /// Classifies an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Bytes that were still released before the failure was hit.
    pub const fn credited_bytes(&self) -> u64 {
        match self {
            Self::PartialFailure { freed, .. } | Self::ExternalActionFailed { freed, .. } => {
                *freed
            }
            _ => 0,
        }
    }

    /// A missing target is a no-op, not a failure.
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors that abort the whole run before anything is touched.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("cannot measure filesystem at {}: {source}", .path.display())]
    FatalConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
