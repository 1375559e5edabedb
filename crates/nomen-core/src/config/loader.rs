//! Configuration loader for YAML files

use crate::config::types::NomenConfig;
use crate::errors::NomenError;
use std::path::Path;
use tokio::fs;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<NomenConfig, NomenError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).await.map_err(|e| {
            NomenError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_str(&content)?;
        if let Some(base_dir) = path.parent() {
            Self::resolve_paths(&mut config, base_dir);
        }
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_str(content: &str) -> Result<NomenConfig, NomenError> {
        // An empty document deserializes to null, which means "all defaults".
        let config: NomenConfig = if content.trim().is_empty() {
            NomenConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| {
                NomenError::ConfigError(format!("Failed to parse YAML config: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    // Relative paths in a config file are relative to that file
    fn resolve_paths(config: &mut NomenConfig, base_dir: &Path) {
        let rebase = |path: &Path| {
            if path.is_relative() && !base_dir.as_os_str().is_empty() {
                base_dir.join(path)
            } else {
                path.to_path_buf()
            }
        };

        config.dictionary.path = rebase(&config.dictionary.path);
        config.output.path = rebase(&config.output.path);
        config.requests.file = config.requests.file.take().map(|file| rebase(&file));
        config.logging.file = config.logging.file.take().map(|file| rebase(&file));
    }
}
