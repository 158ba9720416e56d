use crate::error::CleanupError;
use crate::model::DiskUsageSnapshot;
use nix::sys::statvfs::statvfs;
use std::io;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Something that can report usage of the filesystem holding a path.
pub trait UsageSource {
    fn snapshot(&self, path: &Path) -> Result<DiskUsageSnapshot, CleanupError>;
}

/// Reads usage straight from `statvfs(3)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskUsageMonitor;

impl UsageSource for DiskUsageMonitor {
    fn snapshot(&self, path: &Path) -> Result<DiskUsageSnapshot, CleanupError> {
        let stat = statvfs(path).map_err(|errno| CleanupError::FatalConfig {
            path: path.to_path_buf(),
            source: io::Error::from(errno),
        })?;

        // Field widths differ between platforms.
        #[allow(clippy::useless_conversion, clippy::unnecessary_cast)]
        let (blocks, available, fragment) = (
            stat.blocks() as u64,
            stat.blocks_available() as u64,
            stat.fragment_size() as u64,
        );

        Ok(DiskUsageSnapshot::new(
            blocks.saturating_mul(fragment),
            available.saturating_mul(fragment),
        ))
    }
}

/// True when free space is strictly below the threshold, or when forced.
pub fn needs_cleanup(snapshot: &DiskUsageSnapshot, threshold_percent: f64, force: bool) -> bool {
    force || snapshot.free_percent < threshold_percent
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub mount_point: PathBuf,
    pub file_system: String,
}

/// The mount holding `path`, i.e. the longest mount point that prefixes it.
pub fn mount_point_for(path: &Path) -> Option<MountInfo> {
    let path = path.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|d| path.starts_with(d.mount_point()))
        .max_by_key(|d| d.mount_point().components().count())
        .map(|d| MountInfo {
            mount_point: d.mount_point().to_path_buf(),
            file_system: d.file_system().to_string_lossy().into_owned(),
        })
}
