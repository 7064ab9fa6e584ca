//! Chat configuration loader for GeoChat.
//!
//! Reads `config.toml` (from the data directory, `~/.geochat/` in production,
//! or an explicit path) and deserializes it into [`ChatConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use geochat_types::config::ChatConfig;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Path of the configuration file inside `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Load chat configuration from `config_path`.
///
/// - If the file does not exist, returns [`ChatConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_chat_config(config_path: &Path) -> ChatConfig {
    let content = match tokio::fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    parse_or_default(&content, config_path)
}

/// Blocking variant of [`load_chat_config`] for non-async contexts
/// (filesystem watcher callbacks).
pub fn load_chat_config_blocking(config_path: &Path) -> ChatConfig {
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_or_default(&content, config_path),
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            ChatConfig::default()
        }
    }
}

fn parse_or_default(content: &str, config_path: &Path) -> ChatConfig {
    match toml::from_str::<ChatConfig>(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfig::default()
        }
    }
}

/// Apply command-line overrides on top of a loaded configuration.
///
/// Blank values are ignored.
pub fn apply_overrides(mut config: ChatConfig, user_name: Option<&str>, server_uri: Option<&str>) -> ChatConfig {
    if let Some(name) = user_name.map(str::trim).filter(|n| !n.is_empty()) {
        config.user_name = name.to_string();
    }
    if let Some(uri) = server_uri.map(str::trim).filter(|u| !u.is_empty()) {
        config.server_uri = Some(uri.to_string());
    }
    config
}
