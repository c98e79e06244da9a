use crate::domain::config::RigConfig;
use crate::domain::error::{RigError, RigResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager: the global config file plus an optional explicit
/// override path from the command line.
pub struct ConfigManager {
    global_config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> RigResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| RigError::Config {
            message: "could not determine home directory".to_string(),
        })?;

        Ok(Self {
            global_config_path: home.join(".config").join("radrig").join("config.toml"),
        })
    }

    /// Load the explicit file when given (missing is an error), otherwise
    /// the global file when present; `None` when no configuration exists.
    pub fn load(&self, explicit: Option<&Path>) -> RigResult<Option<RigConfig>> {
        match explicit {
            Some(path) => Ok(Some(self.load_from_path(path)?)),
            None if self.global_config_path.exists() => {
                Ok(Some(self.load_from_path(&self.global_config_path)?))
            }
            None => Ok(None),
        }
    }

    pub fn load_from_path(&self, path: &Path) -> RigResult<RigConfig> {
        let content = fs::read_to_string(path).map_err(|e| RigError::Config {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| RigError::Config {
            message: format!("failed to parse config file {}: {}", path.display(), e),
        })
    }

    pub fn save_to_path(&self, path: &Path, config: &RigConfig) -> RigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RigError::Config {
                message: format!("failed to create config directory: {}", e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| RigError::Config {
            message: format!("failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| RigError::Config {
            message: format!("failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a starter configuration; refuses to overwrite an existing one
    pub fn init(&self, output: Option<PathBuf>) -> RigResult<PathBuf> {
        let path = output.unwrap_or_else(|| self.global_config_path.clone());
        if path.exists() {
            return Err(RigError::Config {
                message: format!("configuration already exists at {}", path.display()),
            });
        }

        self.save_to_path(&path, &RigConfig::example())?;
        Ok(path)
    }

    pub fn global_path(&self) -> &Path {
        &self.global_config_path
    }
}
