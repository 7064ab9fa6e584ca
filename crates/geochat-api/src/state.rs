//! Filesystem locations used by the CLI commands.

use std::path::PathBuf;

use geochat_infra::config::config_path;
use geochat_infra::filesystem::resolve_data_dir;
use geochat_infra::sqlite::pool::database_url;

/// Data directory and configuration file for this invocation.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
}

impl AppPaths {
    /// Resolve the data directory, using `config_override` as the config file
    /// when given.
    pub fn resolve(config_override: Option<PathBuf>) -> Self {
        let data_dir = resolve_data_dir();
        let config_path = config_override.unwrap_or_else(|| config_path(&data_dir));
        Self {
            data_dir,
            config_path,
        }
    }

    pub fn database_url(&self) -> String {
        database_url(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_path_wins() {
        let paths = AppPaths::resolve(Some(PathBuf::from("/tmp/custom.toml")));
        assert_eq!(paths.config_path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn default_config_lives_in_data_dir() {
        let paths = AppPaths::resolve(None);
        assert!(paths.config_path.starts_with(&paths.data_dir));
        assert!(paths.database_url().contains("geochat.db"));
    }
}
