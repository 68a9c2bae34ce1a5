//! # TrackerKit Communication
//!
//! Interfaces a tracker consumes from its live-memory backends:
//! - Bridge backends maintain a link to an intermediary process that relays
//!   console memory reads
//! - Push backends receive unsolicited variable updates for announced slots
//!
//! Includes in-memory simulated backends for tests and demos.

pub mod backend;
pub mod simulated;

pub use backend::{
    BackendFactory, BridgeBackend, InfoHandler, NoBackends, PushBackend, VarHandler,
};

pub use simulated::{SimulatedBridge, SimulatedFactory, SimulatedPush};
