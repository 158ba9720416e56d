use crate::constants::{APT_ARCHIVES, APT_GET};
use crate::targets::ExternalCommandTarget;
use crate::targets::command::CommandSpec;
use std::path::{Path, PathBuf};

/// `apt-get autoremove` followed by `apt-get clean`. The downloaded archive
/// cache is the only part that can be sized beforehand.
pub fn apt_target(measured_path: &Path) -> ExternalCommandTarget {
    ExternalCommandTarget::new(
        "APT packages",
        vec![
            CommandSpec::new(APT_GET, &["-y", "autoremove"]),
            CommandSpec::new(APT_GET, &["clean"]),
        ],
        measured_path.to_path_buf(),
    )
    .estimated_from(PathBuf::from(APT_ARCHIVES))
}
