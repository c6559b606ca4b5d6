//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::schema::WizardRegistry;

/// Name of the per-directory config file
pub const PROJECT_CONFIG_FILE: &str = ".stepform.yaml";

/// stepform configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wizard to run when none is given (built-in name or path)
    pub default_wizard: Option<String>,

    /// Log filter used when RUST_LOG is not set
    pub log_level: Option<String>,

    /// Hide secret fields on the review screen
    pub mask_secrets: Option<bool>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    ///
    /// Files that cannot be read or parsed are skipped. A warning for each is
    /// returned so the caller can report it once logging is set up.
    pub fn load() -> (Self, Vec<String>) {
        let mut config = Config::default();
        let mut warnings = Vec::new();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/stepform/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            warnings.extend(config.merge_file(&global_path));
        }

        // 3. Config in the working directory (.stepform.yaml)
        if let Ok(cwd) = std::env::current_dir() {
            warnings.extend(config.merge_file(&cwd.join(PROJECT_CONFIG_FILE)));
        }

        // 4. Environment variables
        if let Ok(wizard) = std::env::var("STEPFORM_WIZARD") {
            config.default_wizard = Some(wizard);
        }
        if let Ok(level) = std::env::var("STEPFORM_LOG") {
            config.log_level = Some(level);
        }

        (config, warnings)
    }

    /// Parse a config document
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(contents)
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stepform")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a config file if it exists and parses
    ///
    /// Returns a warning when the file exists but was skipped.
    fn merge_file(&mut self, path: &Path) -> Option<String> {
        if !path.exists() {
            return None;
        }
        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|contents| Self::from_yaml(&contents).map_err(|e| e.to_string()));
        match parsed {
            Ok(other) => {
                self.merge(other);
                None
            }
            Err(e) => Some(format!("ignoring unreadable config {}: {}", path.display(), e)),
        }
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.default_wizard.is_some() {
            self.default_wizard = other.default_wizard;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        if other.mask_secrets.is_some() {
            self.mask_secrets = other.mask_secrets;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Wizard to run, falling back to the built-in registration wizard
    pub fn default_wizard(&self) -> String {
        self.default_wizard
            .clone()
            .unwrap_or_else(|| WizardRegistry::DEFAULT.to_string())
    }

    pub fn log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| "warn".to_string())
    }

    pub fn mask_secrets(&self) -> bool {
        self.mask_secrets.unwrap_or(true)
    }
}
