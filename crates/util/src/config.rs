//! Form runtime configuration.
//!
//! The configuration lives in a small JSON file, by default
//! `~/.config/wfe/forms.json` on most platforms. A missing file yields the
//! defaults; a malformed file is reported and the defaults are used instead.
//! Individual settings can be overridden through environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the configuration file path.
pub const CONFIG_PATH_ENV: &str = "WFE_FORMS_CONFIG";

/// Environment variable overriding [`FormsConfig::scripts_dir`].
pub const SCRIPTS_DIR_ENV: &str = "WFE_SCRIPTS_DIR";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "forms.json";

/// Endpoint that serves asynchronous form component requests.
pub const DEFAULT_COMPONENT_ENDPOINT: &str = "/form.do";

/// Error surfaced when reading or writing the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization failure.
    #[error("configuration serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Settings for rendering form components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Directory holding component scripts (`scripts/<Component>.js` is resolved
    /// relative to it). When unset, only the embedded scripts are available.
    pub scripts_dir: Option<PathBuf>,
    /// URL substituted for the `jsonUrl` placeholder in exported scripts.
    pub component_endpoint: String,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            scripts_dir: None,
            component_endpoint: DEFAULT_COMPONENT_ENDPOINT.to_string(),
        }
    }
}

impl FormsConfig {
    /// Loads the configuration from the default location and applies
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads the configuration from `path` and applies environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = load_payload(path)?;
        config.scripts_dir = config.scripts_dir.map(|dir| match dir.to_str() {
            Some(text) => expand_tilde(text),
            None => dir,
        });
        if let Ok(dir) = env::var(SCRIPTS_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                config.scripts_dir = Some(expand_tilde(trimmed));
            }
        }
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Path of the configuration file, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir().unwrap_or_else(|| PathBuf::from(".")).join("wfe").join(CONFIG_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<FormsConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse forms configuration; using defaults"
                );
                Ok(FormsConfig::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(FormsConfig::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}
