//! # Event Bus Module
//!
//! Typed publish/subscribe channel between a tracker and its host.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Synchronous handlers run on the publishing thread; async consumers
//!   take a broadcast receiver instead
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trackerkit_core::event_bus::{EventBus, EventCategory, EventFilter, TrackerEvent};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::State]),
//!     |event| {
//!         if let TrackerEvent::StateChanged(state) = event {
//!             println!("now {}", state);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
