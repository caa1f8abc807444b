//! Configuration handling for formdesk

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::PRINT_PLACEHOLDER;

/// User configuration, all keys optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormdeskConfig {
    /// Catalog id of the form selected at startup
    pub default_form: Option<String>,
    /// Open every form in print mode
    pub start_in_print_mode: Option<bool>,
    /// Text drawn for empty values in print mode
    pub print_placeholder: Option<String>,
    /// Set to false to lock approval role names on every form
    pub roles_editable: Option<bool>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: Option<String>,
    /// Write logs here instead of stderr
    pub log_file: Option<PathBuf>,
}

impl FormdeskConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "formdesk", "formdesk")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(Self::default())
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn placeholder(&self) -> &str {
        self.print_placeholder.as_deref().unwrap_or(PRINT_PLACEHOLDER)
    }

    pub fn roles_editable(&self) -> bool {
        self.roles_editable.unwrap_or(true)
    }

    pub fn start_in_print_mode(&self) -> bool {
        self.start_in_print_mode.unwrap_or(false)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("formdesk=info")
    }
}
