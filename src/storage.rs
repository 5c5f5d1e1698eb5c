// Storage path resolution and whole-file access to the user-data file.
// Every operation opens, fully reads or writes, and closes the file.

use crate::config::AppConfig;
use crate::document::{self, UserDataDocument};
use crate::error::{AppError, Result};
use log::{debug, info};
use std::fs;

/// What `resolve` had to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Existing,
    CreatedFile,
    CreatedDirAndFile,
}

impl Resolution {
    /// Lines to show the user, in order.
    pub fn messages(self) -> &'static [&'static str] {
        match self {
            Resolution::Existing => &[],
            Resolution::CreatedFile => &["SYSTEM: JSON file has been created."],
            Resolution::CreatedDirAndFile => &[
                "SYSTEM: Directory created in AppData.",
                "SYSTEM: JSON file has been created.",
            ],
        }
    }

    pub fn log(self, config: &AppConfig) {
        if self == Resolution::CreatedDirAndFile {
            info!("Created data directory {}", config.data_dir.display());
        }
        if self != Resolution::Existing {
            info!("Created empty data file {}", config.data_file.display());
        }
    }
}

/// Make sure the data file exists, creating its directory and an empty
/// document on first run. Does nothing when the file is already there.
pub fn resolve(config: &AppConfig) -> Result<Resolution> {
    if config.data_file.exists() {
        debug!("Data file present at {}", config.data_file.display());
        return Ok(Resolution::Existing);
    }

    let mut resolution = Resolution::CreatedFile;
    if !config.data_dir.exists() {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| AppError::io(&config.data_dir, e))?;
        resolution = Resolution::CreatedDirAndFile;
    }

    write(config, &UserDataDocument::default())?;
    Ok(resolution)
}

pub fn read(config: &AppConfig) -> Result<Vec<u8>> {
    fs::read(&config.data_file).map_err(|e| AppError::io(&config.data_file, e))
}

/// Encode and replace the whole file.
pub fn write(config: &AppConfig, doc: &UserDataDocument) -> Result<()> {
    let bytes = document::encode(doc)?;
    fs::write(&config.data_file, bytes).map_err(|e| AppError::io(&config.data_file, e))?;
    debug!("Wrote {} user(s) to {}", doc.users.len(), config.data_file.display());
    Ok(())
}

pub fn delete(config: &AppConfig) -> Result<()> {
    fs::remove_file(&config.data_file).map_err(|e| AppError::io(&config.data_file, e))?;
    info!("Deleted data file {}", config.data_file.display());
    Ok(())
}
