//! Configuration for TrackerKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats. The default location is platform-specific.
//!
//! Configuration is organized into two sections:
//! - Tracker settings (platform, backend selection, polling cadence)
//! - Logging settings (level, output format)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use trackerkit_tracker::options::{
    DEFAULT_CONSOLE_PLATFORM, DEFAULT_DISPLAY_NAME, DEFAULT_EXIT_GRACE, DEFAULT_PUSH_FLAG,
};
use trackerkit_tracker::TrackerOptions;

use crate::error::{SettingsError, SettingsResult};

/// Tracker session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Platform id of the loaded pack
    pub platform: String,
    /// Capability flags of the loaded pack
    pub flags: Vec<String>,
    /// Platform ids served by the bridge backend
    pub console_platforms: Vec<String>,
    /// Capability flag that opts into the push backend
    pub push_flag: String,
    /// Name announced to a bridge
    pub display_name: String,
    /// Delay between poll cycles in milliseconds
    pub poll_interval_ms: u64,
    /// Upper bound for waiting on a blocking teardown, in milliseconds
    pub exit_grace_ms: u64,
    /// Number of poll cycles the demo session runs
    pub max_cycles: u32,
    /// Keep recent events for diagnostics
    pub event_history: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            platform: DEFAULT_CONSOLE_PLATFORM.to_string(),
            flags: Vec::new(),
            console_platforms: vec![DEFAULT_CONSOLE_PLATFORM.to_string()],
            push_flag: DEFAULT_PUSH_FLAG.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            poll_interval_ms: 100,
            exit_grace_ms: DEFAULT_EXIT_GRACE.as_millis() as u64,
            max_cycles: 20,
            event_history: false,
        }
    }
}

impl TrackerSettings {
    /// Capability flags as a set
    pub fn flag_set(&self) -> HashSet<String> {
        self.flags.iter().cloned().collect()
    }

    /// Delay between poll cycles
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Tracker construction options for these settings
    pub fn to_options(&self) -> TrackerOptions {
        TrackerOptions {
            console_platforms: self.console_platforms.clone(),
            push_flag: self.push_flag.clone(),
            display_name: self.display_name.clone(),
            exit_grace: Duration::from_millis(self.exit_grace_ms),
            event_history: self.event_history,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when RUST_LOG is unset, e.g. "info" or
    /// "trackerkit_tracker=debug"
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracker settings
    pub tracker: TrackerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform default config location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("trackerkit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let tracker = &self.tracker;

        if tracker.display_name.trim().is_empty() {
            return Err(SettingsError::invalid(
                "tracker.display_name",
                "must not be empty",
            ));
        }

        if tracker.push_flag.is_empty() {
            return Err(SettingsError::invalid("tracker.push_flag", "must not be empty"));
        }

        if tracker.poll_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "tracker.poll_interval_ms",
                "must be > 0",
            ));
        }

        if tracker.console_platforms.iter().all(|p| p.is_empty()) {
            return Err(SettingsError::invalid(
                "tracker.console_platforms",
                "at least one console platform is required",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::invalid("logging.level", "must not be empty"));
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracker.display_name, "PopTracker");
        assert_eq!(config.tracker.push_flag, "uat");
        assert_eq!(config.tracker.exit_grace_ms, 21);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::new();
        config.tracker.poll_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::InvalidSetting { ref key, .. }) if key == "tracker.poll_interval_ms"
        ));

        let mut config = Config::new();
        config.tracker.display_name = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.tracker.console_platforms.clear();
        assert!(config.validate().is_err());

        let mut config = Config::new();
        config.tracker.push_flag.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_options() {
        let mut settings = TrackerSettings::default();
        settings.console_platforms = vec!["snes".to_string(), "sfc".to_string()];
        settings.exit_grace_ms = 50;

        let options = settings.to_options();
        assert!(options.is_console_platform("SFC"));
        assert_eq!(options.exit_grace, Duration::from_millis(50));
        assert_eq!(options.display_name, "PopTracker");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[tracker]\nplatform = \"gba\"\nflags = [\"uat\"]\n")
            .unwrap();
        assert_eq!(config.tracker.platform, "gba");
        assert_eq!(config.tracker.flag_set().len(), 1);
        assert_eq!(config.tracker.poll_interval_ms, 100);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_log_format_names() {
        let config: Config = serde_json::from_str(r#"{"logging":{"format":"json"}}"#).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::new().save_to_file(Path::new("config.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::UnsupportedFormat(ext) if ext == "yaml"));
    }
}
