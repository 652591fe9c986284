//! # Configuration Management Module
//!
//! Persistent dashboard settings stored in the platform config directory.
//! Handles loading, saving, and providing defaults for configuration options.
//!
//! ## Settings
//! - `data_dir`: Directory containing the three JSON datasets
//! - `initial_display_date`: Date the time cursor starts on (clamped to the data range)
//! - `reference_country`: Country whose last case sample ends the time range
//! - `show_relative_values`: Initial unit mode of the country view
//! - `frame_cache_size`: Number of resolved map frames kept in memory
//!
//! ## Storage Location
//! - macOS: ~/Library/Application Support/covid-drilldown/config.toml
//! - Linux: ~/.config/covid-drilldown/config.toml
//! - Windows: %APPDATA%\covid-drilldown\config.toml

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CASES_FILE: &str = "owid-covid-data.json";
pub const VACCINATIONS_FILE: &str = "vaccinations.json";
pub const COUNTRIES_FILE: &str = "countries.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub initial_display_date: NaiveDate,
    pub reference_country: String,
    pub show_relative_values: bool,
    pub frame_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets"),
            initial_display_date: NaiveDate::from_ymd_opt(2022, 3, 11).unwrap_or_default(),
            reference_country: "FIN".to_string(),
            show_relative_values: true,
            frame_cache_size: 64,
        }
    }
}

impl Config {
    /// Get the path to the config file
    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("covid-drilldown")
            .join("config.toml")
    }

    /// Load config from the platform location, or create default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = toml::from_str(&contents).map_err(ConfigError::ParseFailed)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFailed(e)),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        fs::write(path, toml_string).map_err(ConfigError::WriteFailed)?;

        Ok(())
    }

    pub fn cases_path(&self) -> PathBuf {
        self.data_dir.join(CASES_FILE)
    }

    pub fn vaccinations_path(&self) -> PathBuf {
        self.data_dir.join(VACCINATIONS_FILE)
    }

    pub fn countries_path(&self) -> PathBuf {
        self.data_dir.join(COUNTRIES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reference_country, "FIN");
        assert!(config.show_relative_values);
        assert_eq!(
            config.initial_display_date,
            NaiveDate::from_ymd_opt(2022, 3, 11).unwrap()
        );
        assert_eq!(config.cases_path(), PathBuf::from("assets/owid-covid-data.json"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            show_relative_values: false,
            ..Config::default()
        };

        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("show_relative_values = false"));
        assert!(toml_str.contains("initial_display_date = \"2022-03-11\""));
    }

    #[test]
    fn test_config_deserialization_fills_missing_fields() {
        let toml_str = r#"
            data_dir = "/srv/covid"
            reference_country = "SWE"
        "#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(config.data_dir, PathBuf::from("/srv/covid"));
        assert_eq!(config.reference_country, "SWE");
        assert_eq!(config.frame_cache_size, 64);
    }

    #[test]
    fn test_config_load_creates_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_config_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            frame_cache_size: 8,
            initial_display_date: NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_config_rejects_bad_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "initial_display_date = \"yesterday\"").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
