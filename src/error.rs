use std::io;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

pub type Result<T> = StdResult<T, AppError>;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal error")]
    Terminal(#[source] io::Error),

    #[error("malformed user data")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode user data")]
    Encode(#[source] serde_json::Error),

    #[error("application data directory not found")]
    NoDataDir,

    #[error("failed to initialize logger: {0}")]
    Logger(String),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Terminal(err)
    }
}
