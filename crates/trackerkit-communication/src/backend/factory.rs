//! Backend construction
//!
//! The tracker decides which kind of backend to bind; a factory decides
//! how that backend is built.

use super::{BridgeBackend, PushBackend};

/// Creates backends on behalf of a tracker
pub trait BackendFactory {
    /// Build a bridge backend that identifies itself as `display_name`.
    ///
    /// Returning `None` leaves the tracker without a backend.
    fn create_bridge(&self, display_name: &str) -> Option<Box<dyn BridgeBackend>>;

    /// Build a push backend.
    ///
    /// Returning `None` leaves the tracker without a backend.
    fn create_push(&self) -> Option<Box<dyn PushBackend>>;
}

/// Factory that never provides a backend
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackends;

impl BackendFactory for NoBackends {
    fn create_bridge(&self, display_name: &str) -> Option<Box<dyn BridgeBackend>> {
        tracing::debug!("No bridge backend available for {:?}", display_name);
        None
    }

    fn create_push(&self) -> Option<Box<dyn PushBackend>> {
        tracing::debug!("No push backend available");
        None
    }
}
