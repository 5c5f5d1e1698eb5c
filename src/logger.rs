use crate::config::AppConfig;
use crate::error::{AppError, Result};

use std::time::SystemTime;

use fern::Dispatch;
use log::info;

/// Send `log` records to the log file next to the data file.
///
/// The terminal is reserved for prompts, so nothing is chained to stdout.
/// Must run after the data directory exists.
pub fn initialize(config: &AppConfig) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(|e| {
            AppError::Logger(format!(
                "failed to open log file {}: {}",
                config.log_file.display(),
                e
            ))
        })?;

    Dispatch::new()
        .level(config.log_level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{file}:{line}]",
                date = humantime::format_rfc3339(SystemTime::now()),
                level = record.level(),
                message = message,
                file = record.file().unwrap_or("unknown"),
                line = record.line().unwrap_or(0),
            ))
        })
        .chain(file)
        .apply()
        .map_err(|e| AppError::Logger(e.to_string()))?;

    info!(
        "Logger initialized: level={:?}, file={}",
        config.log_level,
        config.log_file.display()
    );
    Ok(())
}
