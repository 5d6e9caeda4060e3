//! CLI configuration and persisted UI state

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logboard")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".logboard")
    }
}

/// Get the config file path
pub fn config_file() -> PathBuf {
    config_dir().join("config.yml")
}

/// Get the UI state file path
pub fn ui_state_file() -> PathBuf {
    config_dir().join("ui_state.json")
}

/// Ensure the config directory exists
pub fn ensure_dirs() -> Result<()> {
    fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    Ok(())
}

/// Main configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log-analyzer server URL (default: http://127.0.0.1:8000)
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load() -> Result<Self> {
        let path = config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(config_file(), content).context("Failed to write config file")?;
        Ok(())
    }
}

/// Visual state restored across runs. Only the filter panel's
/// collapsed flag for now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiState {
    #[serde(default = "default_collapsed")]
    pub filter_collapsed: bool,
}

fn default_collapsed() -> bool {
    true
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            filter_collapsed: default_collapsed(),
        }
    }
}

impl UiState {
    /// Load UI state from file
    pub fn load() -> Result<Self> {
        let path = ui_state_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read UI state file")?;
        let state: UiState =
            serde_json::from_str(&content).context("Failed to parse UI state file")?;

        Ok(state)
    }

    /// Save UI state to file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        let content = serde_json::to_string_pretty(self).context("Failed to serialize UI state")?;
        fs::write(ui_state_file(), content).context("Failed to write UI state file")?;
        Ok(())
    }
}
