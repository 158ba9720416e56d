use crate::error::ReclaimError;
use crate::model::TargetKind;
use crate::targets::ReclaimTarget;
use crate::targets::utils::{remove_entry, size_of};
use std::fs;
use std::path::PathBuf;

/// Removes a cache directory in its entirety. All or nothing is credited.
pub struct WholeDirectoryRemoval {
    pub id: String,
    pub path: PathBuf,
}

impl WholeDirectoryRemoval {
    pub fn new(id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            id: id.into(),
            path,
        }
    }
}

impl ReclaimTarget for WholeDirectoryRemoval {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TargetKind {
        TargetKind::WholeDirectory
    }

    fn describe(&self) -> String {
        format!("Clear {} at {}", self.id, self.path.display())
    }

    fn estimate(&self) -> Result<u64, ReclaimError> {
        Ok(size_of(&self.path))
    }

    fn reclaim(&self) -> Result<u64, ReclaimError> {
        fs::symlink_metadata(&self.path).map_err(|e| ReclaimError::from_io(&self.path, e))?;

        let size = size_of(&self.path);
        remove_entry(&self.path).map_err(|e| ReclaimError::from_io(&self.path, e))?;
        Ok(size)
    }
}
