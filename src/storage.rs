use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{COMMON_RESOURCE_TYPES, SETTINGS_DIR, SETTINGS_FILE};

/// Persisted settings. Credentials are deliberately absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL remembered from an explicit save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Resource types offered by the composer; built-in list when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_types: Vec<String>,
}

impl Settings {
    /// Catalog for the resource-type selector
    pub fn resource_catalog(&self) -> Vec<String> {
        if self.resource_types.is_empty() {
            COMMON_RESOURCE_TYPES.iter().map(|s| s.to_string()).collect()
        } else {
            self.resource_types.clone()
        }
    }
}

/// Where the remembered base URL lives
pub trait SettingsStore: Send {
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> Result<()>;

    fn load_base_url(&self) -> Option<String> {
        self.load().base_url.filter(|url| !url.is_empty())
    }

    fn save_base_url(&self, base_url: &str) -> Result<()> {
        let mut settings = self.load();
        settings.base_url = Some(base_url.to_string());
        self.save(&settings)
    }
}

/// Settings kept as YAML in a config directory
pub struct FileSettingsStore {
    config_dir: PathBuf,
}

impl FileSettingsStore {
    /// Store under `~/.resource-console`
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_DIR);
        Self::with_dir(config_dir)
    }

    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        FileSettingsStore {
            config_dir: config_dir.into(),
        }
    }

    fn path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Ensure config directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    /// Missing or unreadable files give default settings
    fn load(&self) -> Settings {
        let path = self.path();
        if !path.exists() {
            return Settings::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed settings file");
                    Settings::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read settings file");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_yaml::to_string(settings)?;
        fs::write(self.path(), content)?;
        Ok(())
    }
}
