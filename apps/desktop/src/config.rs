use assistant::AssistantConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub assistant: AssistantConfig,
}

/// `<config dir>/videonote/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("videonote").join("config.json"))
}

impl AppConfig {
    /// Defaults, then the config file if present, then the process environment.
    pub fn load() -> Self {
        let mut config = match config_path() {
            Some(path) => match Self::from_file(&path) {
                Ok(Some(config)) => {
                    info!("loaded config from {}", path.display());
                    config
                }
                Ok(None) => Self::default(),
                Err(err) => {
                    warn!("ignoring config file: {err}");
                    Self::default()
                }
            },
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.assistant.api_key = key;
        }
        if let Some(model) = non_empty("VIDEONOTE_VISION_MODEL") {
            self.assistant.vision_model = model;
        }
        if let Some(model) = non_empty("VIDEONOTE_TEXT_MODEL") {
            self.assistant.text_model = model;
        }
    }
}
