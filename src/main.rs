use anyhow::Context;
use std::path::PathBuf;

use trackerkit::{
    init_logging, AutoTracker, BackendKind, Config, EventFilter, PushState, SimulatedBridge,
    SimulatedFactory, SimulatedPush, SlotInfo, VariableUpdate, BUILD_DATE, VERSION,
};

/// Config from the first argument, else the default location if present,
/// else built-in defaults.
fn load_config() -> anyhow::Result<Config> {
    if let Some(arg) = std::env::args_os().nth(1) {
        let path = PathBuf::from(arg);
        return Config::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match Config::default_path() {
        Ok(path) if path.exists() => Config::load_from_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        _ => Ok(Config::default()),
    }
}

/// Backends that play out a short session: the link comes up, the console
/// appears, and a few values change.
fn simulated_factory(cycles: u32) -> SimulatedFactory {
    let bridge = SimulatedBridge::new();
    bridge.script([(false, false), (true, false), (true, true)]);
    bridge.poke(0x7e0010, &[0x03]);
    bridge.poke(0x7e0020, &[0x40, 0x01]);

    let push = SimulatedPush::new();
    push.script([PushState::SocketConnected, PushState::GameConnected]);
    push.queue_slots(SlotInfo::new(["Player1"]));
    for i in 0..cycles.min(5) {
        push.queue_variables(vec![VariableUpdate::new("Player1", "health", 10 + i)]);
    }

    SimulatedFactory::with_backends(bridge, push)
}

fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&config.logging)?;
    tracing::info!("TrackerKit {} (built {})", VERSION, BUILD_DATE);

    let settings = &config.tracker;
    let factory = simulated_factory(settings.max_cycles);
    let mut tracker = AutoTracker::with_options(
        &settings.platform,
        &settings.flag_set(),
        &factory,
        settings.to_options(),
    );
    tracker.subscribe(EventFilter::All, |event| {
        tracing::info!("Event: {}", event.description());
    });

    if tracker.backend_kind() == BackendKind::Bridge {
        tracker.set_poll_interval(settings.poll_interval_ms);
    }

    for cycle in 0..settings.max_cycles {
        if tracker.poll() {
            match tracker.backend_kind() {
                BackendKind::Bridge => {
                    let keys = tracker.read_u8(0x7e0010);
                    let rupees = tracker.read_u16(0x7e0020);
                    let bombs = tracker.read_u8(0x7e0030);
                    tracing::debug!(
                        "Cycle {}: keys={} rupees={} bombs={}",
                        cycle,
                        keys,
                        rupees,
                        bombs
                    );
                }
                BackendKind::Push => {
                    tracing::debug!(
                        "Cycle {}: health={}",
                        cycle,
                        tracker.read_variable("health")
                    );
                }
                BackendKind::None => {}
            }
        }
        std::thread::sleep(settings.poll_interval());
    }

    tracing::info!("Session finished in state {}", tracker.state());
    let mut handle = tracker.shutdown();
    if !handle.settle() {
        tracing::info!("Backend still shutting down in the background");
    }

    Ok(())
}
