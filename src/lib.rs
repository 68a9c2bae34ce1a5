//! # TrackerKit
//!
//! Live console-state tracking for pack-driven progress trackers:
//! - A bridge backend for consoles whose memory can be read remotely
//! - A push backend for games that report named variables themselves
//! - One polling facade with a three-state connection model
//!
//! ## Architecture
//!
//! TrackerKit is organized as a workspace with multiple crates:
//!
//! 1. **trackerkit-core** - Shared types, errors, and the event bus
//! 2. **trackerkit-communication** - Backend traits and simulated backends
//! 3. **trackerkit-tracker** - The `AutoTracker` facade
//! 4. **trackerkit-settings** - Configuration files and validation
//! 5. **trackerkit** - This crate, plus a binary running a simulated session

pub use trackerkit_communication::{
    BackendFactory, BridgeBackend, InfoHandler, NoBackends, PushBackend, SimulatedBridge,
    SimulatedFactory, SimulatedPush, VarHandler,
};
pub use trackerkit_core::{
    BackendError, ConnectionState, Error, EventBus, EventCategory, EventFilter, MemoryError,
    MemoryWidth, PushState, Result, SlotInfo, SubscriptionId, TrackerEvent, VariableUpdate, Watch,
};
pub use trackerkit_settings::{Config, LogFormat, LoggingSettings, SettingsError, TrackerSettings};
pub use trackerkit_tracker::{AutoTracker, BackendKind, ShutdownHandle, TrackerOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging from `settings`
///
/// Sets up structured logging with:
/// - Console output, pretty or JSON per `settings.format`
/// - `settings.level` as the filter, unless RUST_LOG is set
/// - Thread names, since variable events arrive on backend threads
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)?,
    };

    match settings.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_level(true)
                .with_thread_names(true)
                .with_line_number(true)
                .pretty();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true)
                .with_thread_names(true)
                .json();

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}
