//! Configuration management for Leadgrid.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the places provider API key.
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Shortest wait before a page token is accepted by the provider.
pub const MIN_PAGE_TOKEN_DELAY_MS: u64 = 2000;

/// Main application configuration.
///
/// This is loaded from `~/.config/leadgrid/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where list documents live
    pub storage: StorageConfig,
    /// Grid search behavior
    pub scraping: ScrapingConfig,
    /// Places provider connection settings
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LEADGRID_LISTS_DIR`: Override the lists directory
    /// - `LEADGRID_GRID_STEP_M`: Override the grid step in meters
    /// - `LEADGRID_PAGE_TOKEN_DELAY_MS`: Override the pagination wait
    /// - `GOOGLE_MAPS_API_KEY`: Provider API key (never read from the file)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Unparseable values are ignored and the configured value is kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("LEADGRID_LISTS_DIR") {
            tracing::debug!("Override storage.lists_dir from env: {}", dir);
            self.storage.lists_dir = Some(PathBuf::from(dir));
        }

        if let Some(val) = lookup("LEADGRID_GRID_STEP_M") {
            if let Ok(step) = val.parse() {
                self.scraping.grid_step_m = step;
                tracing::debug!("Override scraping.grid_step_m from env: {}", step);
            }
        }

        if let Some(val) = lookup("LEADGRID_PAGE_TOKEN_DELAY_MS") {
            if let Ok(delay) = val.parse() {
                self.scraping.page_token_delay_ms = delay;
                tracing::debug!("Override scraping.page_token_delay_ms from env: {}", delay);
            }
        }

        if let Some(key) = lookup(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.provider.api_key = Some(key);
            }
        }
    }

    /// Check value constraints that TOML typing cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scraping.grid_step_m == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.grid_step_m".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.scraping.max_pages_per_point == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.max_pages_per_point".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.scraping.page_token_delay_ms < MIN_PAGE_TOKEN_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                field: "scraping.page_token_delay_ms".to_string(),
                reason: format!("must be at least {MIN_PAGE_TOKEN_DELAY_MS}"),
            });
        }
        if !(self.scraping.query_radius_factor.is_finite()
            && self.scraping.query_radius_factor > 0.0)
        {
            return Err(ConfigError::InvalidValue {
                field: "scraping.query_radius_factor".to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Directory holding list documents.
    ///
    /// Uses `storage.lists_dir` when set, otherwise `<data_dir>/lists`.
    pub fn lists_dir(&self) -> ConfigResult<PathBuf> {
        match &self.storage.lists_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("lists")),
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leadgrid/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "leadgrid", "leadgrid").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/leadgrid`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "leadgrid", "leadgrid").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for list documents (defaults to the data dir)
    pub lists_dir: Option<PathBuf>,
}

/// Grid search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Spacing between grid points in meters
    pub grid_step_m: u32,
    /// Maximum result pages fetched per (keyword, point)
    pub max_pages_per_point: u32,
    /// Wait before a page token becomes usable, in milliseconds
    pub page_token_delay_ms: u64,
    /// Per-query radius as a multiple of the grid step
    pub query_radius_factor: f64,
}

impl ScrapingConfig {
    /// Pagination wait as a `Duration`.
    #[must_use]
    pub fn page_token_delay(&self) -> Duration {
        Duration::from_millis(self.page_token_delay_ms)
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            grid_step_m: 500,
            max_pages_per_point: 3,
            page_token_delay_ms: 2000,
            query_radius_factor: 1.5,
        }
    }
}

/// Places provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the Google Maps web services
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Preferred result language (e.g. "it"), provider default if unset
    pub language: Option<String>,
    /// API key (read from `GOOGLE_MAPS_API_KEY`, never written to disk)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            timeout_secs: 30,
            language: None,
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scraping.grid_step_m, 500);
        assert_eq!(config.scraping.max_pages_per_point, 3);
        assert_eq!(config.scraping.page_token_delay(), Duration::from_secs(2));
        assert!((config.scraping.query_radius_factor - 1.5).abs() < f64::EPSILON);
        assert!(config.storage.lists_dir.is_none());
        assert!(config.provider.api_key.is_none());
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("secret".to_string());

        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scraping]"));
        assert!(toml_str.contains("[provider]"));
        assert!(!toml_str.contains("secret"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.scraping.grid_step_m, config.scraping.grid_step_m);
        assert!(parsed.provider.api_key.is_none());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scraping.grid_step_m = 750;
        config.storage.lists_dir = Some(tmp.path().join("lists"));

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.scraping.grid_step_m, 750);
        assert_eq!(
            loaded.lists_dir().expect("lists dir"),
            tmp.path().join("lists")
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LEADGRID_LISTS_DIR", "/tmp/leadgrid-lists"),
            ("LEADGRID_GRID_STEP_M", "250"),
            ("LEADGRID_PAGE_TOKEN_DELAY_MS", "not-a-number"),
            (API_KEY_ENV, "abc123"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(ToString::to_string));

        assert_eq!(
            config.storage.lists_dir,
            Some(PathBuf::from("/tmp/leadgrid-lists"))
        );
        assert_eq!(config.scraping.grid_step_m, 250);
        // Unparseable override keeps the default
        assert_eq!(config.scraping.page_token_delay_ms, 2000);
        assert_eq!(config.provider.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == API_KEY_ENV).then(|| "   ".to_string()));
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let mut config = AppConfig::default();
        config.scraping.grid_step_m = 0;
        let err = config.validate().expect_err("zero step rejected");
        assert!(err.to_string().contains("scraping.grid_step_m"));
    }

    #[test]
    fn test_validate_rejects_short_page_token_delay() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == "LEADGRID_PAGE_TOKEN_DELAY_MS").then(|| "0".to_string()));
        assert_eq!(config.scraping.page_token_delay_ms, 0);

        let err = config.validate().expect_err("zero delay rejected");
        assert!(err.to_string().contains("scraping.page_token_delay_ms"));

        config.scraping.page_token_delay_ms = MIN_PAGE_TOKEN_DELAY_MS;
        config.validate().expect("minimum delay accepted");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[scraping]
grid_step_m = 300

[provider]
language = "it"
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scraping.grid_step_m, 300);
        assert_eq!(config.provider.language.as_deref(), Some("it"));
        // These should be defaults
        assert_eq!(config.scraping.max_pages_per_point, 3);
        assert_eq!(config.provider.timeout_secs, 30);
    }
}
