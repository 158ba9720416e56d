use crate::constants::{CHROMIUM_CACHE, FIREFOX_CACHE, FIREFOX_SNAP_CACHE};
use crate::targets::WholeDirectoryRemoval;
use std::path::Path;

pub fn browser_cache_targets(home: &Path) -> [WholeDirectoryRemoval; 3] {
    [
        // Firefox
        WholeDirectoryRemoval::new("Firefox cache", home.join(FIREFOX_CACHE)),
        // Firefox installed from the Snap store
        WholeDirectoryRemoval::new("Firefox Snap cache", home.join(FIREFOX_SNAP_CACHE)),
        // Chromium
        WholeDirectoryRemoval::new("Chromium cache", home.join(CHROMIUM_CACHE)),
    ]
}
