//! Tracker facade
//!
//! [`AutoTracker`] wraps whichever live-memory backend suits the loaded
//! pack behind one polling API. Nothing here returns an error to the host:
//! every failure degrades to a sentinel (`false`, `0`, empty bytes,
//! `Value::Null`) and is logged.

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use trackerkit_communication::{BackendFactory, BridgeBackend};
use trackerkit_core::{
    ConnectionState, EventBus, EventFilter, MemoryError, MemoryWidth, SubscriptionId,
    TrackerEvent,
};
use tokio::sync::broadcast;

use crate::memory;
use crate::options::TrackerOptions;
use crate::selection::{Backend, BackendKind};
use crate::shutdown::ShutdownHandle;
use crate::state::StateMachine;
use crate::variables::{self, VariableStore};

/// Backend-agnostic console state facade
///
/// Poll it from one thread at a steady cadence. [`AutoTracker::poll`] is
/// not reentrant and takes `&mut self`, so concurrent polling is ruled out
/// by the borrow checker.
pub struct AutoTracker {
    backend: Backend,
    machine: StateMachine,
    events: Arc<EventBus>,
    variables: Arc<VariableStore>,
    options: TrackerOptions,
    last_connect_error: Option<String>,
}

impl AutoTracker {
    /// Create a tracker for `platform` with default options.
    ///
    /// `display_name` is forwarded to a bridge backend's handshake.
    pub fn new(
        platform: &str,
        flags: &HashSet<String>,
        display_name: &str,
        factory: &dyn BackendFactory,
    ) -> Self {
        Self::with_options(
            platform,
            flags,
            factory,
            TrackerOptions::with_display_name(display_name),
        )
    }

    /// Create a tracker with explicit options
    pub fn with_options(
        platform: &str,
        flags: &HashSet<String>,
        factory: &dyn BackendFactory,
        options: TrackerOptions,
    ) -> Self {
        let events = Arc::new(EventBus::with_config(options.event_bus_config()));
        let variables = Arc::new(VariableStore::new());

        let backend = match BackendKind::select(platform, flags, &options) {
            BackendKind::Bridge => factory
                .create_bridge(&options.display_name)
                .map_or(Backend::None, Backend::Bridge),
            BackendKind::Push => match factory.create_push() {
                Some(mut push) => {
                    push.set_info_handler(variables::info_handler(variables.clone()));
                    push.set_var_handler(variables::var_handler(
                        variables.clone(),
                        events.clone(),
                    ));
                    Backend::Push(push)
                }
                None => Backend::None,
            },
            BackendKind::None => Backend::None,
        };
        tracing::info!(
            "Tracker for platform {:?} bound to {} backend",
            platform,
            backend.kind()
        );

        Self {
            backend,
            machine: StateMachine::new(),
            events,
            variables,
            options,
            last_connect_error: None,
        }
    }

    /// Kind of backend this tracker is bound to
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Options this tracker was built with
    pub fn options(&self) -> &TrackerOptions {
        &self.options
    }

    /// Event bus carrying state, data, and variable notifications
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe a synchronous handler to tracker events.
    ///
    /// Variable events are delivered on the push backend's callback thread.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(TrackerEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    /// Remove a handler added with [`AutoTracker::subscribe`]
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Receiver for async consumers. Outlives the tracker safely.
    pub fn receiver(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.receiver()
    }

    /// Drive the bound backend for one cycle.
    ///
    /// Returns whether the backend reported anything new, which hosts use
    /// to decide whether to re-evaluate dependent state. An unbound tracker
    /// always returns false.
    pub fn poll(&mut self) -> bool {
        match &mut self.backend {
            Backend::Bridge(bridge) => {
                let connected = bridge.connect();
                note_connect_result(&mut self.last_connect_error, connected);
                if !bridge.poll_once() {
                    return false;
                }
                let link_up = bridge.is_link_up();
                let console_reachable = link_up && bridge.is_console_reachable();
                if let Some(event) = self.machine.observe_bridge(link_up, console_reachable) {
                    self.events.publish(event).ok();
                }
                true
            }
            Backend::Push(push) => {
                let connected = push.connect();
                note_connect_result(&mut self.last_connect_error, connected);
                if !push.poll_once() {
                    return false;
                }
                if let Some(event) = self.machine.observe_push(push.state()) {
                    self.events.publish(event).ok();
                }
                true
            }
            Backend::None => false,
        }
    }

    /// Register `len` bytes at `addr` for the bridge's refresh cycle
    pub fn add_watch(&mut self, addr: u32, len: u32) -> bool {
        let result = self
            .bridge_mut()
            .and_then(|bridge| memory::add_watch(bridge, u64::from(addr), len));
        sentinel("add_watch", result.map(|_| true))
    }

    /// Remove a range registered with [`AutoTracker::add_watch`]
    pub fn remove_watch(&mut self, addr: u32, len: u32) -> bool {
        let result = self
            .bridge_mut()
            .and_then(|bridge| memory::remove_watch(bridge, u64::from(addr), len));
        sentinel("remove_watch", result.map(|_| true))
    }

    /// Hint the bridge's refresh cadence
    pub fn set_poll_interval(&mut self, ms: u64) -> bool {
        match &mut self.backend {
            Backend::Bridge(bridge) => {
                bridge.set_update_interval(Duration::from_millis(ms));
                true
            }
            _ => false,
        }
    }

    /// Invalidate cached data.
    ///
    /// A bridge drops its memory cache; a push backend resynchronizes the
    /// selected slot. Returns false if nothing was asked of a backend.
    pub fn clear_cache(&mut self) -> bool {
        match &mut self.backend {
            Backend::Bridge(bridge) => {
                bridge.clear_cache();
                true
            }
            Backend::Push(push) => match self.variables.selected_slot() {
                Some(slot) => {
                    push.sync(&slot);
                    true
                }
                None => false,
            },
            Backend::None => false,
        }
    }

    /// Read `len` raw bytes starting at `addr`. Never registers a watch.
    pub fn read_raw(&self, addr: u32, len: u32) -> Vec<u8> {
        let result = self
            .bridge()
            .and_then(|bridge| memory::read_raw(bridge, u64::from(addr), len));
        sentinel("read_raw", result)
    }

    /// Read a typed value without touching the watch list
    pub fn peek(&self, addr: u32, width: MemoryWidth) -> u32 {
        let result = self
            .bridge()
            .and_then(|bridge| memory::peek(bridge, u64::from(addr), width));
        sentinel("peek", result)
    }

    /// Read a typed value, watching its range when the read returns zero.
    ///
    /// See [`crate::memory`] for why a zero read also registers a watch.
    pub fn read_and_watch(&mut self, addr: u32, width: MemoryWidth) -> u32 {
        self.read_and_watch_at(u64::from(addr), width)
    }

    /// 8-bit read; watches the byte if it reads zero
    pub fn read_u8(&mut self, addr: u32) -> u8 {
        self.read_and_watch(addr, MemoryWidth::U8) as u8
    }

    /// 16-bit little-endian read; watches the range if it reads zero
    pub fn read_u16(&mut self, addr: u32) -> u16 {
        self.read_and_watch(addr, MemoryWidth::U16) as u16
    }

    /// 24-bit little-endian read; watches the range if it reads zero
    pub fn read_u24(&mut self, addr: u32) -> u32 {
        self.read_and_watch(addr, MemoryWidth::U24)
    }

    /// 32-bit little-endian read; watches the range if it reads zero
    pub fn read_u32(&mut self, addr: u32) -> u32 {
        self.read_and_watch(addr, MemoryWidth::U32)
    }

    /// Segment-indexed 8-bit read.
    ///
    /// There is a single implicit segment, so `segment + offset` is the address.
    pub fn read_segment_u8(&mut self, segment: u32, offset: u32) -> u8 {
        self.read_and_watch_at(segment_address(segment, offset), MemoryWidth::U8) as u8
    }

    /// Segment-indexed 16-bit read
    pub fn read_segment_u16(&mut self, segment: u32, offset: u32) -> u16 {
        self.read_and_watch_at(segment_address(segment, offset), MemoryWidth::U16) as u16
    }

    /// Segment-indexed 24-bit read
    pub fn read_segment_u24(&mut self, segment: u32, offset: u32) -> u32 {
        self.read_and_watch_at(segment_address(segment, offset), MemoryWidth::U24)
    }

    /// Segment-indexed 32-bit read
    pub fn read_segment_u32(&mut self, segment: u32, offset: u32) -> u32 {
        self.read_and_watch_at(segment_address(segment, offset), MemoryWidth::U32)
    }

    /// Latest pushed value of `name`, or `Value::Null`.
    ///
    /// A pure cache lookup; nothing is fetched or watched.
    pub fn read_variable(&self, name: &str) -> Value {
        self.variables.get(name)
    }

    /// Push slot whose variables are being tracked
    pub fn selected_slot(&self) -> Option<String> {
        self.variables.selected_slot()
    }

    /// Tear down the backend without blocking the caller.
    ///
    /// The handle reports when a backend that may block on exit has
    /// finished on its worker thread.
    pub fn shutdown(mut self) -> ShutdownHandle {
        self.teardown()
    }

    fn teardown(&mut self) -> ShutdownHandle {
        let grace = self.options.exit_grace;
        match std::mem::replace(&mut self.backend, Backend::None) {
            Backend::Bridge(bridge) => {
                let may_block = bridge.may_block_on_exit();
                ShutdownHandle::retire(bridge, may_block, grace, |bridge| bridge.shutdown())
            }
            Backend::Push(push) => {
                let may_block = push.may_block_on_exit();
                ShutdownHandle::retire(push, may_block, grace, |push| push.shutdown())
            }
            Backend::None => ShutdownHandle::complete(grace),
        }
    }

    fn read_and_watch_at(&mut self, addr: u64, width: MemoryWidth) -> u32 {
        let result = self
            .bridge_mut()
            .and_then(|bridge| memory::read_and_watch(bridge, addr, width));
        sentinel("read_and_watch", result)
    }

    fn bridge(&self) -> Result<&dyn BridgeBackend, MemoryError> {
        match &self.backend {
            Backend::Bridge(bridge) => Ok(&**bridge),
            _ => Err(MemoryError::NoBackend),
        }
    }

    fn bridge_mut(&mut self) -> Result<&mut (dyn BridgeBackend + 'static), MemoryError> {
        match &mut self.backend {
            Backend::Bridge(bridge) => Ok(&mut **bridge),
            _ => Err(MemoryError::NoBackend),
        }
    }
}

impl Drop for AutoTracker {
    fn drop(&mut self) {
        // handle discarded: a blocking backend finishes on its own
        let _ = self.teardown();
    }
}

impl std::fmt::Debug for AutoTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoTracker")
            .field("backend", &self.backend)
            .field("state", &self.machine.state())
            .field("slot", &self.variables.selected_slot())
            .finish()
    }
}

fn segment_address(segment: u32, offset: u32) -> u64 {
    u64::from(segment) + u64::from(offset)
}

fn sentinel<T: Default>(op: &str, result: Result<T, MemoryError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::debug!("{} failed: {}", op, e);
        T::default()
    })
}

/// Log connect failures once per distinct error instead of every cycle
fn note_connect_result(last: &mut Option<String>, result: trackerkit_core::Result<()>) {
    match result {
        Ok(()) => {
            if last.take().is_some() {
                tracing::info!("Backend connect succeeded");
            }
        }
        Err(e) => {
            let message = e.to_string();
            if last.as_deref() == Some(message.as_str()) {
                tracing::trace!("Backend connect still failing: {}", message);
            } else {
                tracing::warn!("Backend connect failed: {}", message);
                *last = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackerkit_communication::{NoBackends, SimulatedFactory};

    fn no_flags() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_segment_address_does_not_wrap() {
        assert_eq!(segment_address(u32::MAX, 1), u64::from(u32::MAX) + 1);
        assert_eq!(segment_address(0x7e0000, 0x10), 0x7e0010);
    }

    #[test]
    fn test_declining_factory_leaves_tracker_inert() {
        let mut tracker = AutoTracker::new("snes", &no_flags(), "PopTracker", &NoBackends);
        assert_eq!(tracker.backend_kind(), BackendKind::None);
        assert!(!tracker.poll());
        assert!(!tracker.add_watch(0x10, 1));
    }

    #[test]
    fn test_display_name_reaches_bridge() {
        let factory = SimulatedFactory::new();
        let tracker = AutoTracker::new("SNES", &no_flags(), "MyTracker", &factory);
        assert_eq!(tracker.backend_kind(), BackendKind::Bridge);
        assert_eq!(factory.bridge().unwrap().display_name(), "MyTracker");
    }

    #[test]
    fn test_drop_shuts_backend_down() {
        let factory = SimulatedFactory::new();
        let tracker = AutoTracker::new("snes", &no_flags(), "PopTracker", &factory);
        drop(tracker);
        assert!(factory.bridge().unwrap().is_shut_down());
    }

    #[test]
    fn test_connect_errors_logged_once() {
        let mut last = None;
        let err = || -> trackerkit_core::Result<()> {
            Err(trackerkit_core::BackendError::NotConnected.into())
        };
        note_connect_result(&mut last, err());
        assert_eq!(last.as_deref(), Some("Backend not connected"));
        note_connect_result(&mut last, err());
        note_connect_result(&mut last, Ok(()));
        assert!(last.is_none());
    }
}
