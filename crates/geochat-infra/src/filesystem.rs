use std::path::PathBuf;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `GEOCHAT_DATA_DIR` environment variable
/// 2. `~/.geochat` under the home directory
/// 3. `.geochat` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GEOCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".geochat");
    }

    PathBuf::from(".geochat")
}
