//! # TrackerKit Core
//!
//! Core types and errors shared by the TrackerKit crates, plus the event
//! bus used to notify hosts.

pub mod data;
pub mod error;
pub mod event_bus;
pub mod types;

pub use data::{
    check_address, ConnectionState, MemoryWidth, PushState, SlotInfo, VariableUpdate, Watch,
    ADDRESS_LIMIT, MAX_ADDRESS,
};

pub use error::{BackendError, Error, MemoryError, Result};

pub use event_bus::{
    EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter, SubscriptionId,
    TrackerEvent,
};

pub use types::{thread_safe, thread_safe_rw, ThreadSafe, ThreadSafeRw};
