// Configuration resolved once at startup and passed to every operation
// that touches the filesystem.

use crate::error::{AppError, Result};
use log::LevelFilter;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "FinancesApp";
pub const DATA_FILE_NAME: &str = "userdata.json";
pub const LOG_FILE_NAME: &str = "financesapp.log";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl AppConfig {
    /// Resolve the per-user application data directory for this platform
    /// (roaming AppData on Windows, `~/.config` on Linux).
    pub fn from_platform() -> Result<Self> {
        let base = dirs::config_dir().ok_or(AppError::NoDataDir)?;
        Ok(Self::in_dir(base.join(APP_DIR_NAME)))
    }

    /// Lay the data and log files out under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let data_dir = dir.as_ref().to_path_buf();
        AppConfig {
            data_file: data_dir.join(DATA_FILE_NAME),
            log_file: data_dir.join(LOG_FILE_NAME),
            data_dir,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_the_data_dir() {
        let config = AppConfig::in_dir("/data/FinancesApp");
        assert_eq!(config.data_file, Path::new("/data/FinancesApp/userdata.json"));
        assert_eq!(config.log_file, Path::new("/data/FinancesApp/financesapp.log"));
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn platform_dir_ends_with_app_name() {
        if let Ok(config) = AppConfig::from_platform() {
            assert!(config.data_dir.ends_with(APP_DIR_NAME));
            assert!(config.data_file.ends_with(DATA_FILE_NAME));
        }
    }
}
