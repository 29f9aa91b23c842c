use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetentionError {
    #[error("Upload folder does not exist")]
    MissingRoot { path: PathBuf },

    #[error("Upload root is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Failed to scan {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Error {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cleanup interval must be positive")]
    InvalidInterval,

    #[error("Cleanup scheduler requires a running Tokio runtime")]
    NoRuntime,
}

impl RetentionError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RetentionError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetentionError>;
