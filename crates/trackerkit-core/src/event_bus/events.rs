//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

use crate::data::ConnectionState;

/// Root event enum for everything a tracker reports to its host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerEvent {
    /// The tracker moved to a new connection state
    StateChanged(ConnectionState),
    /// Console memory may have changed; re-read anything of interest
    DataChanged,
    /// Push variables with these names received new values
    VariablesChanged(Vec<String>),
}

impl TrackerEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            TrackerEvent::StateChanged(_) => EventCategory::State,
            TrackerEvent::DataChanged => EventCategory::Data,
            TrackerEvent::VariablesChanged(_) => EventCategory::Variables,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            TrackerEvent::StateChanged(state) => format!("State: {}", state),
            TrackerEvent::DataChanged => "Data changed".to_string(),
            TrackerEvent::VariablesChanged(names) => {
                format!("Variables changed: {}", names.join(", "))
            }
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Connection state transitions.
    State,
    /// Per-cycle memory refresh notifications.
    Data,
    /// Push variable change notifications.
    Variables,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::State => write!(f, "State"),
            EventCategory::Data => write!(f, "Data"),
            EventCategory::Variables => write!(f, "Variables"),
        }
    }
}
