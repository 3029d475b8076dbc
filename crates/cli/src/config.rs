//! Configuration management for the CLI

use anyhow::{Context, Result};
use optimizer_lib::Priority;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Service address used when neither flag, env nor config file sets one
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// API endpoint URL
    pub api_url: Option<String>,
    /// Default output format
    pub default_format: Option<OutputFormat>,
    /// Default priority for `suggest`
    pub default_priority: Option<Priority>,
}

impl Config {
    /// Load configuration from `~/.config/carbonctl/config.json`, if present
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).context("Failed to read config file")?;

        serde_json::from_str(&content).context("Failed to parse config file")
    }

    /// Flag/env value wins over the config file
    pub fn api_url(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn format(&self, flag: Option<OutputFormat>) -> OutputFormat {
        flag.or(self.default_format).unwrap_or_default()
    }

    pub fn priority(&self, flag: Option<Priority>) -> Priority {
        flag.or(self.default_priority).unwrap_or_default()
    }

    /// Get the configuration file path
    fn config_path() -> Result<PathBuf> {
        let home = dirs_next::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("carbonctl").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();

        assert_eq!(config.api_url(None), DEFAULT_API_URL);
        assert!(matches!(config.format(None), OutputFormat::Table));
        assert_eq!(config.priority(None), Priority::Carbon);
    }

    #[test]
    fn test_file_values_apply_below_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_url": "http://optimizer:9000", "default_format": "json", "default_priority": "balanced"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url(None), "http://optimizer:9000");
        assert_eq!(
            config.api_url(Some("http://flag:1".into())),
            "http://flag:1"
        );
        assert!(matches!(config.format(None), OutputFormat::Json));
        assert_eq!(config.priority(None), Priority::Balanced);
        assert_eq!(
            config.priority(Some(Priority::Performance)),
            Priority::Performance
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();

        assert!(Config::load_from(&path).is_err());
    }
}
