//! Connection state machine
//!
//! Turns backend connectivity reports into [`ConnectionState`] transitions
//! and the events a host sees for them.

use trackerkit_core::{ConnectionState, PushState, TrackerEvent};

/// Three-state connection model fed by backend polling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateMachine {
    state: ConnectionState,
}

impl StateMachine {
    /// Start disconnected
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Apply a bridge backend report.
    ///
    /// Emits a state change on transition. While the console stays
    /// reachable every report also yields a data refresh, since watched
    /// memory may have moved on.
    pub fn observe_bridge(
        &mut self,
        link_up: bool,
        console_reachable: bool,
    ) -> Option<TrackerEvent> {
        let next = ConnectionState::from_link(link_up, console_reachable);
        if let Some(event) = self.transition(next) {
            return Some(event);
        }
        next.has_console().then_some(TrackerEvent::DataChanged)
    }

    /// Apply a push backend report.
    ///
    /// Only transitions produce events; push backends announce their own
    /// data changes through variable batches.
    pub fn observe_push(&mut self, reported: PushState) -> Option<TrackerEvent> {
        self.transition(reported.into())
    }

    fn transition(&mut self, next: ConnectionState) -> Option<TrackerEvent> {
        if next == self.state {
            return None;
        }
        tracing::info!("Tracker state: {} -> {}", self.state, next);
        self.state = next;
        Some(TrackerEvent::StateChanged(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_transition_table() {
        let mut machine = StateMachine::new();
        let reports = [(false, false), (true, false), (true, true), (true, true)];
        let events: Vec<Option<TrackerEvent>> = reports
            .into_iter()
            .map(|(link, console)| machine.observe_bridge(link, console))
            .collect();

        assert_eq!(
            events,
            vec![
                None,
                Some(TrackerEvent::StateChanged(ConnectionState::BridgeConnected)),
                Some(TrackerEvent::StateChanged(ConnectionState::ConsoleConnected)),
                Some(TrackerEvent::DataChanged),
            ]
        );
    }

    #[test]
    fn test_bridge_no_refresh_without_console() {
        let mut machine = StateMachine::new();
        assert!(machine.observe_bridge(true, false).is_some());
        assert_eq!(machine.observe_bridge(true, false), None);
        assert_eq!(machine.observe_bridge(true, false), None);
    }

    #[test]
    fn test_bridge_regression_to_disconnected() {
        let mut machine = StateMachine::new();
        machine.observe_bridge(true, true);
        assert_eq!(
            machine.observe_bridge(false, true),
            Some(TrackerEvent::StateChanged(ConnectionState::Disconnected))
        );
        assert_eq!(machine.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_push_transitions_only() {
        let mut machine = StateMachine::new();
        assert_eq!(machine.observe_push(PushState::Disconnected), None);
        assert_eq!(
            machine.observe_push(PushState::GameConnected),
            Some(TrackerEvent::StateChanged(ConnectionState::ConsoleConnected))
        );
        assert_eq!(machine.observe_push(PushState::GameConnected), None);
        assert_eq!(
            machine.observe_push(PushState::SocketConnected),
            Some(TrackerEvent::StateChanged(ConnectionState::BridgeConnected))
        );
    }
}
