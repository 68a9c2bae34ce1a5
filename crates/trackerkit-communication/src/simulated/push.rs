//! In-memory push backend
//!
//! Slot announcements and variable batches can be delivered immediately
//! from the calling thread (like a backend's network thread) or queued for
//! delivery during the next poll cycle.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use trackerkit_core::{BackendError, PushState, Result, SlotInfo, ThreadSafe, VariableUpdate};

use crate::backend::{InfoHandler, PushBackend, VarHandler};

type SharedInfoHandler = Arc<dyn Fn(&SlotInfo) -> Option<String> + Send + Sync>;
type SharedVarHandler = Arc<dyn Fn(&[VariableUpdate]) + Send + Sync>;

#[derive(Default)]
struct PushSim {
    state: PushState,
    script: VecDeque<PushState>,
    queued_info: VecDeque<SlotInfo>,
    queued_vars: VecDeque<Vec<VariableUpdate>>,
    info_handler: Option<SharedInfoHandler>,
    var_handler: Option<SharedVarHandler>,
    syncs: Vec<String>,
    connect_error: Option<BackendError>,
    connect_attempts: u32,
    exit_delay: Option<Duration>,
    shut_down: bool,
}

/// Simulated push backend with scripted link state
#[derive(Clone, Default)]
pub struct SimulatedPush {
    inner: ThreadSafe<PushSim>,
}

impl std::fmt::Debug for SimulatedPush {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sim = self.inner.lock();
        f.debug_struct("SimulatedPush")
            .field("state", &sim.state)
            .field("syncs", &sim.syncs)
            .finish()
    }
}

impl SimulatedPush {
    /// Create a disconnected push backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `shutdown` block for `delay`
    pub fn with_blocking_exit(self, delay: Duration) -> Self {
        self.inner.lock().exit_delay = Some(delay);
        self
    }

    /// Make every connect attempt fail with `error`
    pub fn fail_connect(&self, error: BackendError) {
        self.inner.lock().connect_error = Some(error);
    }

    /// Set link state immediately
    pub fn set_state(&self, state: PushState) {
        self.inner.lock().state = state;
    }

    /// Queue link states, one consumed per poll cycle
    pub fn script<I>(&self, steps: I)
    where
        I: IntoIterator<Item = PushState>,
    {
        self.inner.lock().script.extend(steps);
    }

    /// Deliver a slot announcement now, on the calling thread
    pub fn announce_slots(&self, info: SlotInfo) {
        let handler = self.inner.lock().info_handler.clone();
        if let Some(handler) = handler {
            if let Some(slot) = handler(&info) {
                self.record_sync(&slot);
            }
        }
    }

    /// Deliver a variable batch now, on the calling thread
    pub fn push_variables(&self, batch: Vec<VariableUpdate>) {
        let handler = self.inner.lock().var_handler.clone();
        if let Some(handler) = handler {
            handler(&batch);
        }
    }

    /// Queue a slot announcement for the next poll cycle
    pub fn queue_slots(&self, info: SlotInfo) {
        self.inner.lock().queued_info.push_back(info);
    }

    /// Queue a variable batch for the next poll cycle
    pub fn queue_variables(&self, batch: Vec<VariableUpdate>) {
        self.inner.lock().queued_vars.push_back(batch);
    }

    /// Slots synced so far, in request order
    pub fn syncs(&self) -> Vec<String> {
        self.inner.lock().syncs.clone()
    }

    /// Whether both handlers are installed
    pub fn has_handlers(&self) -> bool {
        let sim = self.inner.lock();
        sim.info_handler.is_some() && sim.var_handler.is_some()
    }

    /// Number of connect calls seen
    pub fn connect_attempts(&self) -> u32 {
        self.inner.lock().connect_attempts
    }

    /// Whether shutdown ran to completion
    pub fn is_shut_down(&self) -> bool {
        self.inner.lock().shut_down
    }

    fn record_sync(&self, slot: &str) {
        tracing::trace!("Simulated sync of slot {:?}", slot);
        self.inner.lock().syncs.push(slot.to_string());
    }
}

impl PushBackend for SimulatedPush {
    fn connect(&mut self) -> Result<()> {
        let mut sim = self.inner.lock();
        sim.connect_attempts += 1;
        match &sim.connect_error {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }

    fn poll_once(&mut self) -> bool {
        let (stepped, infos, batches) = {
            let mut sim = self.inner.lock();
            let stepped = match sim.script.pop_front() {
                Some(state) => {
                    sim.state = state;
                    true
                }
                None => false,
            };
            let infos: Vec<SlotInfo> = sim.queued_info.drain(..).collect();
            let batches: Vec<Vec<VariableUpdate>> = sim.queued_vars.drain(..).collect();
            (stepped, infos, batches)
        };

        let delivered = !infos.is_empty() || !batches.is_empty();
        for info in infos {
            self.announce_slots(info);
        }
        for batch in batches {
            self.push_variables(batch);
        }
        stepped || delivered
    }

    fn state(&self) -> PushState {
        self.inner.lock().state
    }

    fn sync(&mut self, slot: &str) {
        self.record_sync(slot);
    }

    fn set_info_handler(&mut self, handler: InfoHandler) {
        self.inner.lock().info_handler = Some(Arc::from(handler));
    }

    fn set_var_handler(&mut self, handler: VarHandler) {
        self.inner.lock().var_handler = Some(Arc::from(handler));
    }

    fn may_block_on_exit(&self) -> bool {
        self.inner.lock().exit_delay.is_some()
    }

    fn shutdown(&mut self) {
        let delay = {
            let mut sim = self.inner.lock();
            sim.state = PushState::Disconnected;
            sim.info_handler = None;
            sim.var_handler = None;
            sim.exit_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        self.inner.lock().shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_info_handler_return_triggers_sync() {
        let mut push = SimulatedPush::new();
        push.set_info_handler(Box::new(|info: &SlotInfo| info.first().map(str::to_string)));

        push.announce_slots(SlotInfo::new(["P1", "P2"]));
        push.announce_slots(SlotInfo::default());

        assert_eq!(push.syncs(), vec!["P1".to_string()]);
    }

    #[test]
    fn test_resync_precedes_next_batch() {
        let mut push = SimulatedPush::new();
        push.set_info_handler(Box::new(|info: &SlotInfo| info.first().map(str::to_string)));
        let observer = push.clone();
        let syncs_at_batch = trackerkit_core::thread_safe(Vec::new());
        let sink = syncs_at_batch.clone();
        push.set_var_handler(Box::new(move |_batch: &[VariableUpdate]| {
            sink.lock().push(observer.syncs().len());
        }));

        push.queue_slots(SlotInfo::new(["P1"]));
        push.queue_variables(vec![VariableUpdate::new("P1", "health", 10)]);
        assert!(push.poll_once());

        assert_eq!(*syncs_at_batch.lock(), vec![1]);
    }

    #[test]
    fn test_queued_delivery_on_poll() {
        let mut push = SimulatedPush::new();
        let batches = Arc::new(AtomicUsize::new(0));
        let counter = batches.clone();
        push.set_var_handler(Box::new(move |_batch: &[VariableUpdate]| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        push.queue_variables(vec![VariableUpdate::new("P1", "health", 10)]);
        assert_eq!(batches.load(Ordering::SeqCst), 0);

        assert!(push.poll_once());
        assert_eq!(batches.load(Ordering::SeqCst), 1);
        assert!(!push.poll_once());
    }

    #[test]
    fn test_scripted_state() {
        let mut push = SimulatedPush::new();
        push.script([PushState::SocketConnected, PushState::GameConnected]);

        assert!(push.poll_once());
        assert_eq!(push.state(), PushState::SocketConnected);
        assert!(push.poll_once());
        assert_eq!(push.state(), PushState::GameConnected);
        assert!(!push.poll_once());
    }

    #[test]
    fn test_shutdown_drops_handlers() {
        let mut push = SimulatedPush::new();
        push.set_info_handler(Box::new(|_: &SlotInfo| None));
        push.set_var_handler(Box::new(|_: &[VariableUpdate]| {}));
        assert!(push.has_handlers());

        push.shutdown();
        assert!(!push.has_handlers());
        assert!(push.is_shut_down());
    }
}
