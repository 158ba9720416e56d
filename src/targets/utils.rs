use jwalk::{DirEntry, Parallelism, WalkDir};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Total byte size of `path`.
///
/// Missing paths weigh nothing. Files and symlinks report their own length,
/// links are never followed. Directories sum every non-directory entry
/// below them; entries whose metadata cannot be read are skipped.
pub fn size_of(path: &Path) -> u64 {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return 0;
    };

    if !metadata.is_dir() {
        return metadata.len();
    }

    // Serial walk keeps one target's sizing from saturating the disk.
    WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .min_depth(1)
        .parallelism(Parallelism::Serial)
        .into_iter()
        .filter_map(entry_len)
        .sum()
}

fn entry_len(entry: Result<DirEntry<((), ())>, jwalk::Error>) -> Option<u64> {
    let entry = match entry {
        Ok(entry) => entry,
        Err(err) => {
            debug!("skipping unreadable entry: {err}");
            return None;
        }
    };

    if entry.file_type().is_dir() {
        return None;
    }

    match entry.metadata() {
        Ok(metadata) => Some(metadata.len()),
        Err(err) => {
            debug!("skipping {}: {err}", entry.path().display());
            None
        }
    }
}

/// Removes a file, symlink or whole directory tree.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
