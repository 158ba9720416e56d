use crate::constants::{TRASH_FILES, TRASH_INFO};
use crate::targets::ContentsOfDirectory;
use std::path::Path;

/// The freedesktop trash keeps payloads in `files` and metadata in `info`;
/// both are emptied but kept.
pub fn trash_targets(home: &Path) -> [ContentsOfDirectory; 2] {
    [
        ContentsOfDirectory::new("Trash files", home.join(TRASH_FILES)),
        ContentsOfDirectory::new("Trash info", home.join(TRASH_INFO)),
    ]
}
