use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagShelfError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigValidationError),
    #[error("corrupt data in {}: {source}", path.display())]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl TagShelfError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, TagShelfError::CorruptData { .. })
    }
}

pub type Result<T, E = TagShelfError> = std::result::Result<T, E>;
