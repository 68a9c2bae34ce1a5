//! In-memory bridge backend
//!
//! Clones share one state, so a test can box one clone into a tracker and
//! keep another to script connectivity and inspect watches.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use trackerkit_core::{BackendError, Result, ThreadSafe, Watch};

use crate::backend::BridgeBackend;

#[derive(Debug, Default)]
struct BridgeSim {
    display_name: String,
    link_up: bool,
    console_reachable: bool,
    last_reported: (bool, bool),
    script: VecDeque<(bool, bool)>,
    memory: HashMap<u32, u8>,
    watches: Vec<Watch>,
    update_interval: Option<Duration>,
    connect_error: Option<BackendError>,
    connect_attempts: u32,
    cache_clears: u32,
    exit_delay: Option<Duration>,
    shut_down: bool,
}

/// Simulated bridge backend with sparse memory and scripted connectivity
#[derive(Debug, Clone, Default)]
pub struct SimulatedBridge {
    inner: ThreadSafe<BridgeSim>,
}

impl SimulatedBridge {
    /// Create a disconnected bridge with empty memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `shutdown` block for `delay`, like a bridge waiting out a
    /// socket timeout.
    pub fn with_blocking_exit(self, delay: Duration) -> Self {
        self.inner.lock().exit_delay = Some(delay);
        self
    }

    /// Make every connect attempt fail with `error`
    pub fn fail_connect(&self, error: BackendError) {
        self.inner.lock().connect_error = Some(error);
    }

    /// Set connectivity immediately
    pub fn set_link(&self, link_up: bool, console_reachable: bool) {
        let mut sim = self.inner.lock();
        sim.link_up = link_up;
        sim.console_reachable = console_reachable;
    }

    /// Queue connectivity reports, one consumed per poll cycle
    pub fn script<I>(&self, steps: I)
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        self.inner.lock().script.extend(steps);
    }

    /// Write bytes into simulated console memory
    pub fn poke(&self, addr: u32, bytes: &[u8]) {
        let mut sim = self.inner.lock();
        for (i, b) in bytes.iter().enumerate() {
            sim.memory.insert(addr.wrapping_add(i as u32), *b);
        }
    }

    /// Currently registered watches, in registration order
    pub fn watches(&self) -> Vec<Watch> {
        self.inner.lock().watches.clone()
    }

    /// Whether any watch covers `addr`
    pub fn is_watched(&self, addr: u32) -> bool {
        self.inner.lock().watches.iter().any(|w| w.contains(addr))
    }

    /// Last update interval hint
    pub fn update_interval(&self) -> Option<Duration> {
        self.inner.lock().update_interval
    }

    /// Name the bridge was created with
    pub fn display_name(&self) -> String {
        self.inner.lock().display_name.clone()
    }

    /// Number of connect calls seen
    pub fn connect_attempts(&self) -> u32 {
        self.inner.lock().connect_attempts
    }

    /// Number of cache clears seen
    pub fn cache_clears(&self) -> u32 {
        self.inner.lock().cache_clears
    }

    /// Whether shutdown ran to completion
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    pub(crate) fn set_display_name(&self, name: &str) {
        self.inner.lock().display_name = name.to_string();
    }
}

impl BridgeBackend for SimulatedBridge {
    fn connect(&mut self) -> Result<()> {
        let mut sim = self.inner.lock();
        sim.connect_attempts += 1;
        match &sim.connect_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }

    fn poll_once(&mut self) -> bool {
        let mut sim = self.inner.lock();
        if let Some((link_up, console_reachable)) = sim.script.pop_front() {
            sim.link_up = link_up;
            sim.console_reachable = console_reachable;
            sim.last_reported = (link_up, console_reachable);
            return true;
        }
        let current = (sim.link_up, sim.console_reachable);
        let changed = current != sim.last_reported;
        sim.last_reported = current;
        // a linked bridge refreshes its watched ranges every cycle
        sim.link_up || changed
    }

    fn is_link_up(&self) -> bool {
        self.inner.lock().link_up
    }

    fn is_console_reachable(&self) -> bool {
        let sim = self.inner.lock();
        sim.link_up && sim.console_reachable
    }

    fn read(&self, addr: u32, buf: &mut [u8]) {
        let sim = self.inner.lock();
        for (i, b) in buf.iter_mut().enumerate() {
            *b = sim
                .memory
                .get(&addr.wrapping_add(i as u32))
                .copied()
                .unwrap_or(0);
        }
    }

    fn add_watch(&mut self, watch: Watch) {
        let mut sim = self.inner.lock();
        if !sim.watches.contains(&watch) {
            sim.watches.push(watch);
        }
    }

    fn remove_watch(&mut self, watch: Watch) {
        self.inner.lock().watches.retain(|w| *w != watch);
    }

    fn set_update_interval(&mut self, interval: Duration) {
        self.inner.lock().update_interval = Some(interval);
    }

    fn clear_cache(&mut self) {
        self.inner.lock().cache_clears += 1;
    }

    fn may_block_on_exit(&self) -> bool {
        self.inner.lock().exit_delay.is_some()
    }

    fn shutdown(&mut self) {
        let delay = {
            let mut sim = self.inner.lock();
            sim.link_up = false;
            sim.console_reachable = false;
            sim.exit_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.inner.lock().shut_down = true;
    }
}
