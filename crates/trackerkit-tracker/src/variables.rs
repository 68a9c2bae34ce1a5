//! Push variable store
//!
//! Holds the selected slot and the latest value of every variable pushed
//! while a slot was selected. Written from the push backend's callback thread, read from the
//! polling thread; one lock guards both the slot and the values so a
//! batch is never applied against a half-changed selection.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use trackerkit_communication::{InfoHandler, VarHandler};
use trackerkit_core::{EventBus, SlotInfo, TrackerEvent, VariableUpdate};

#[derive(Debug, Default)]
struct StoreInner {
    /// Empty means no slot selected
    slot: String,
    vars: HashMap<String, Value>,
}

/// Variable values for the selected push slot
#[derive(Debug, Default)]
pub struct VariableStore {
    inner: Mutex<StoreInner>,
}

impl VariableStore {
    /// Create an empty store with no slot selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the first announced slot, replacing any previous selection.
    ///
    /// An empty announcement clears the selection. Stored values are kept
    /// until the new slot's resync overwrites them. Returns the slot that
    /// needs resynchronizing, if one was selected.
    pub fn select_slot(&self, info: &SlotInfo) -> Option<String> {
        let selected = info.first().unwrap_or_default().to_string();
        self.inner.lock().slot = selected.clone();

        if selected.is_empty() {
            tracing::info!("No slot available, selection cleared");
            None
        } else {
            tracing::info!("Slot selected: {:?}", selected);
            Some(selected)
        }
    }

    /// Currently selected slot
    pub fn selected_slot(&self) -> Option<String> {
        let inner = self.inner.lock();
        (!inner.slot.is_empty()).then(|| inner.slot.clone())
    }

    /// Apply a batch of updates.
    ///
    /// Updates for any slot other than the selected one are dropped.
    /// Returns the names that were written, in batch order.
    pub fn apply(&self, batch: &[VariableUpdate]) -> Vec<String> {
        let mut inner = self.inner.lock();
        if inner.slot.is_empty() {
            return Vec::new();
        }

        let mut changed = Vec::new();
        for update in batch {
            if update.slot != inner.slot {
                continue;
            }
            tracing::debug!("{:?}:{:?} = {}", update.slot, update.name, update.value);
            inner.vars.insert(update.name.clone(), update.value.clone());
            changed.push(update.name.clone());
        }
        changed
    }

    /// Value of `name`, or `Value::Null` if it was never pushed
    pub fn get(&self, name: &str) -> Value {
        self.inner
            .lock()
            .vars
            .get(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Number of stored variables
    pub fn len(&self) -> usize {
        self.inner.lock().vars.len()
    }

    /// Whether no variable has been stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Slot announcement handler bound to `store`
pub(crate) fn info_handler(store: Arc<VariableStore>) -> InfoHandler {
    Box::new(move |info: &SlotInfo| store.select_slot(info))
}

/// Variable batch handler that writes to `store` and reports on `events`
pub(crate) fn var_handler(store: Arc<VariableStore>, events: Arc<EventBus>) -> VarHandler {
    Box::new(move |batch: &[VariableUpdate]| {
        let changed = store.apply(batch);
        if !changed.is_empty() {
            events.publish(TrackerEvent::VariablesChanged(changed)).ok();
        }
    })
}
