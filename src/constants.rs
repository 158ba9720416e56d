pub const TRASH_FILES: &str = ".local/share/Trash/files";
pub const TRASH_INFO: &str = ".local/share/Trash/info";

pub const FIREFOX_CACHE: &str = ".cache/mozilla/firefox";
pub const FIREFOX_SNAP_CACHE: &str = "snap/firefox/common/.cache/mozilla/firefox";
pub const CHROMIUM_CACHE: &str = ".cache/chromium";

pub const APT_ARCHIVES: &str = "/var/cache/apt/archives";
pub const APT_GET: &str = "apt-get";

pub const DEFAULT_THRESHOLD_PERCENT: u8 = 10;
pub const DEFAULT_MEASURED_PATH: &str = "/";
