//! TrackerKit Settings Crate
//!
//! Handles tracker configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{Config, LogFormat, LoggingSettings, TrackerSettings};
pub use error::{SettingsError, SettingsResult};
