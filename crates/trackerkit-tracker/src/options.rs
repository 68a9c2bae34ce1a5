//! Tracker construction options

use serde::{Deserialize, Serialize};
use std::time::Duration;
use trackerkit_core::EventBusConfig;

/// Default name a bridge backend announces itself with
pub const DEFAULT_DISPLAY_NAME: &str = "PopTracker";

/// Default capability flag that opts into the push protocol
pub const DEFAULT_PUSH_FLAG: &str = "uat";

/// Default console platform served by the bridge backend
pub const DEFAULT_CONSOLE_PLATFORM: &str = "snes";

/// Default time `ShutdownHandle::settle` waits for a blocking teardown
pub const DEFAULT_EXIT_GRACE: Duration = Duration::from_millis(21);

/// Options controlling backend selection and teardown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerOptions {
    /// Platform ids (matched ASCII case-insensitively) that select the bridge
    pub console_platforms: Vec<String>,
    /// Capability flag that selects the push backend
    pub push_flag: String,
    /// Name forwarded to the bridge backend's handshake
    pub display_name: String,
    /// Upper bound for `ShutdownHandle::settle`
    #[serde(with = "duration_ms")]
    pub exit_grace: Duration,
    /// Retain the most recent events for diagnostics
    #[serde(default)]
    pub event_history: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            console_platforms: vec![DEFAULT_CONSOLE_PLATFORM.to_string()],
            push_flag: DEFAULT_PUSH_FLAG.to_string(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            exit_grace: DEFAULT_EXIT_GRACE,
            event_history: false,
        }
    }
}

impl TrackerOptions {
    /// Options with a custom display name and defaults otherwise
    pub fn with_display_name(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Whether `platform` names a console served by the bridge backend
    pub fn is_console_platform(&self, platform: &str) -> bool {
        self.console_platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform))
    }

    pub(crate) fn event_bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            enable_history: self.event_history,
            ..EventBusConfig::default()
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_matching_ignores_case() {
        let options = TrackerOptions::default();
        assert!(options.is_console_platform("snes"));
        assert!(options.is_console_platform("SNES"));
        assert!(options.is_console_platform("SnEs"));
        assert!(!options.is_console_platform("n64"));
        assert!(!options.is_console_platform(""));
    }

    #[test]
    fn test_options_json() {
        let options = TrackerOptions::with_display_name("Tracker");
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["exit_grace"], 21);
        assert_eq!(json["display_name"], "Tracker");
    }
}
