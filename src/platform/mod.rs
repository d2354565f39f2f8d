// figdesk platform paths
// Resolves per-user locations for settings, the tab snapshot and the shared
// storage partition.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
const APP_DIR_NAME: &str = "figdesk";

#[cfg(not(target_os = "linux"))]
const APP_DIR_NAME: &str = "Figdesk";

fn fallback_base() -> PathBuf {
    std::env::temp_dir()
}

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/figdesk` (or `~/.config/figdesk`)
/// - **macOS**: `~/Library/Application Support/Figdesk`
/// - **Windows**: `%APPDATA%/Figdesk`
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(fallback_base)
        .join(APP_DIR_NAME)
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `$XDG_DATA_HOME/figdesk` (or `~/.local/share/figdesk`)
/// - **macOS**: `~/Library/Application Support/Figdesk`
/// - **Windows**: `%APPDATA%/Figdesk`
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(fallback_base).join(APP_DIR_NAME)
}

/// Location of the persisted tab snapshot.
pub fn get_snapshot_path() -> PathBuf {
    get_data_dir().join("tabs.json")
}

/// Directory backing the storage partition shared by every tab and popup.
pub fn get_partition_dir() -> PathBuf {
    get_data_dir().join("partition")
}
