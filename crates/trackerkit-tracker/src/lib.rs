//! # TrackerKit Tracker
//!
//! The [`AutoTracker`] facade binds at most one live-memory backend,
//! normalizes its connectivity into a three-state machine, and exposes one
//! typed memory-read surface plus a push-variable store.
//!
//! Hosts drive it by calling [`AutoTracker::poll`] from a single thread at
//! a steady cadence and listen on its event bus.

pub mod memory;
pub mod options;
pub mod selection;
pub mod shutdown;
pub mod state;
pub mod tracker;
pub mod variables;

pub use options::TrackerOptions;
pub use selection::BackendKind;
pub use shutdown::ShutdownHandle;
pub use state::StateMachine;
pub use tracker::AutoTracker;
pub use variables::VariableStore;
