pub mod browsers;
pub mod command;
pub mod contents;
pub mod packages;
pub mod trash;
pub mod utils;
pub mod whole_dir;

use crate::error::ReclaimError;
use crate::model::TargetKind;
use std::path::Path;

pub use command::ExternalCommandTarget;
pub use contents::ContentsOfDirectory;
pub use whole_dir::WholeDirectoryRemoval;

/// One deletable unit of disk space.
pub trait ReclaimTarget {
    fn id(&self) -> &str;
    fn kind(&self) -> TargetKind;

    /// Human-readable action, shown before the user confirms.
    fn describe(&self) -> String;

    /// Bytes the target would release. Never touches the filesystem.
    fn estimate(&self) -> Result<u64, ReclaimError>;

    /// Releases the space and returns the bytes freed.
    fn reclaim(&self) -> Result<u64, ReclaimError>;
}

/// Targets for `home`, in the order they are processed:
/// trash, then browser caches, then package cleanup.
pub fn standard_targets(
    home: &Path,
    measured_path: &Path,
    include_packages: bool,
) -> Vec<Box<dyn ReclaimTarget>> {
    let mut targets: Vec<Box<dyn ReclaimTarget>> = Vec::new();

    targets.extend(
        trash::trash_targets(home)
            .into_iter()
            .map(|t| Box::new(t) as Box<dyn ReclaimTarget>),
    );
    targets.extend(
        browsers::browser_cache_targets(home)
            .into_iter()
            .map(|t| Box::new(t) as Box<dyn ReclaimTarget>),
    );
    if include_packages {
        targets.push(Box::new(packages::apt_target(measured_path)));
    }

    targets
}
