use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FILE_NAME: &str = "tagshelf.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
    /// Where the temporary file is written before it replaces the data file.
    /// Must be on the same filesystem as `data_dir`.
    pub staging_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: DEFAULT_FILE_NAME.to_owned(),
            staging_dir: None,
        }
    }

    /// Uses `data_dir` when given, otherwise the platform data directory.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self, ConfigValidationError> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("com", "tagshelf", "tagshelf")
                .ok_or(ConfigValidationError::NoDataDir)?
                .data_dir()
                .to_path_buf(),
        };
        let config = Self::new(data_dir);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::NoDataDir);
        }
        let mut components = Path::new(&self.file_name).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single {
            return Err(ConfigValidationError::InvalidFileName(self.file_name.clone()));
        }
        Ok(())
    }

    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging_dir.as_deref().unwrap_or(&self.data_dir)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("data file name must be a single path component, got {0:?}")]
    InvalidFileName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins() {
        let config = StoreConfig::resolve(Some(PathBuf::from("/tmp/shelf"))).unwrap();
        assert_eq!(config.data_file(), Path::new("/tmp/shelf/tagshelf.json"));
        assert_eq!(config.staging_dir(), Path::new("/tmp/shelf"));
    }

    #[test]
    fn rejects_nested_file_name() {
        let mut config = StoreConfig::new("/tmp/shelf");
        config.file_name = "nested/data.json".into();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidFileName("nested/data.json".into()))
        );

        config.file_name = String::new();
        assert!(config.validate().is_err());

        config.file_name = "..".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_data_dir() {
        let config = StoreConfig::new("");
        assert_eq!(config.validate(), Err(ConfigValidationError::NoDataDir));
    }
}
