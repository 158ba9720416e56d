use crate::error::ReclaimError;
use crate::model::TargetKind;
use crate::targets::ReclaimTarget;
use crate::targets::utils::{remove_entry, size_of};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

type Remover = fn(&Path) -> io::Result<()>;

/// Empties a directory but keeps the directory itself.
///
/// A root that is not a real directory (a symlink, a plain file) has no
/// contents of its own: it is sized at 0 and left alone, so simulate and real
/// runs agree and nothing is deleted through a link.
pub struct ContentsOfDirectory {
    pub id: String,
    pub root: PathBuf,
    remover: Remover,
}

impl ContentsOfDirectory {
    pub fn new(id: impl Into<String>, root: PathBuf) -> Self {
        Self {
            id: id.into(),
            root,
            remover: remove_entry,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_remover(mut self, remover: Remover) -> Self {
        self.remover = remover;
        self
    }
}

struct EntryFailure {
    path: PathBuf,
    error: io::Error,
}

impl ReclaimTarget for ContentsOfDirectory {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TargetKind {
        TargetKind::ContentsOfDirectory
    }

    fn describe(&self) -> String {
        format!("Empty {} at {}", self.id, self.root.display())
    }

    fn estimate(&self) -> Result<u64, ReclaimError> {
        match fs::symlink_metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => Ok(size_of(&self.root)),
            Ok(_) => {
                warn!("{} is not a directory, skipping", self.root.display());
                Ok(0)
            }
            Err(_) => Ok(0),
        }
    }

    fn reclaim(&self) -> Result<u64, ReclaimError> {
        let metadata =
            fs::symlink_metadata(&self.root).map_err(|e| ReclaimError::from_io(&self.root, e))?;
        if !metadata.is_dir() {
            warn!("{} is not a directory, skipping", self.root.display());
            return Ok(0);
        }

        let entries = fs::read_dir(&self.root).map_err(|e| ReclaimError::from_io(&self.root, e))?;

        let mut freed = 0;
        let mut attempted = 0;
        let mut failures: Vec<EntryFailure> = Vec::new();

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(error) => {
                    attempted += 1;
                    failures.push(EntryFailure {
                        path: self.root.clone(),
                        error,
                    });
                    continue;
                }
            };

            let size = size_of(&path);
            match (self.remover)(&path) {
                Ok(()) => {
                    debug!("removed {} ({size} bytes)", path.display());
                    attempted += 1;
                    freed += size;
                }
                // Someone else got there first; not ours to count.
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => {
                    attempted += 1;
                    warn!("could not remove {}: {error}", path.display());
                    failures.push(EntryFailure { path, error });
                }
            }
        }

        if failures.is_empty() {
            return Ok(freed);
        }

        if failures.len() == attempted {
            let first = failures.swap_remove(0);
            return Err(ReclaimError::from_io(&first.path, first.error));
        }

        let first = &failures[0];
        Err(ReclaimError::PartialFailure {
            freed,
            failed: failures.len(),
            attempted,
            first: format!("{}: {}", first.path.display(), first.error),
        })
    }
}
