//! Type aliases for shared state.
//!
//! Tracker state is touched both by the polling thread and by whatever
//! thread a backend chooses for its callbacks, so everything shared is
//! `Send + Sync` and built on `parking_lot` locks.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trackerkit_core::types::*;
//!
//! // Instead of: Arc<Mutex<BridgeSim>>
//! let sim: ThreadSafe<BridgeSim> = thread_safe(BridgeSim::default());
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
///
/// # Example
/// ```rust,ignore
/// let state: ThreadSafe<Inner> = thread_safe(Inner::default());
/// state.lock().update();
/// ```
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe reader-writer lock wrapper for read-heavy workloads.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
