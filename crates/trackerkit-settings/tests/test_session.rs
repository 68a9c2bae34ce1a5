use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

use trackerkit_communication::{SimulatedFactory, SimulatedPush};
use trackerkit_core::{
    ConnectionState, EventFilter, PushState, SlotInfo, TrackerEvent, VariableUpdate,
};
use trackerkit_settings::Config;
use trackerkit_tracker::{AutoTracker, BackendKind};

#[test]
fn test_session_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[tracker]\nplatform = \"n64\"\nflags = [\"uat\"]\ndisplay_name = \"Demo\"\n",
    )
    .unwrap();
    let config = Config::load_from_file(&path).unwrap();

    let push = SimulatedPush::new();
    push.script([PushState::SocketConnected, PushState::GameConnected]);
    push.queue_slots(SlotInfo::new(["Player1"]));
    push.queue_variables(vec![VariableUpdate::new("Player1", "health", 12)]);
    let factory = SimulatedFactory::with_push(push.clone());

    let mut tracker = AutoTracker::with_options(
        &config.tracker.platform,
        &config.tracker.flag_set(),
        &factory,
        config.tracker.to_options(),
    );
    assert_eq!(tracker.backend_kind(), BackendKind::Push);
    assert_eq!(tracker.options().display_name, "Demo");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    tracker.subscribe(EventFilter::All, move |event| sink.lock().push(event));

    for _ in 0..3 {
        tracker.poll();
    }

    assert_eq!(tracker.state(), ConnectionState::ConsoleConnected);
    assert_eq!(tracker.read_variable("health"), serde_json::json!(12));
    assert_eq!(
        *seen.lock(),
        vec![
            TrackerEvent::VariablesChanged(vec!["health".to_string()]),
            TrackerEvent::StateChanged(ConnectionState::BridgeConnected),
            TrackerEvent::StateChanged(ConnectionState::ConsoleConnected),
        ]
    );

    let mut handle = tracker.shutdown();
    assert!(handle.settle());
    assert!(push.is_shut_down());
}
