//! Backend selection
//!
//! A tracker decides once, at construction, which backend it binds. The
//! decision is captured by [`Backend`], so a tracker can never hold two.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use trackerkit_communication::{BridgeBackend, PushBackend};

use crate::options::TrackerOptions;

/// Which kind of backend a tracker is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Socket/bridge memory backend
    Bridge,
    /// Push variable backend
    Push,
    /// No backend, the tracker is inert
    None,
}

impl BackendKind {
    /// Choose a backend kind from a platform id and capability flags.
    ///
    /// A console platform always wins over the push flag.
    pub fn select(platform: &str, flags: &HashSet<String>, options: &TrackerOptions) -> Self {
        if options.is_console_platform(platform) {
            BackendKind::Bridge
        } else if flags.contains(&options.push_flag) {
            BackendKind::Push
        } else {
            BackendKind::None
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Bridge => write!(f, "bridge"),
            BackendKind::Push => write!(f, "push"),
            BackendKind::None => write!(f, "none"),
        }
    }
}

/// The backend bound to a tracker, if any
pub(crate) enum Backend {
    Bridge(Box<dyn BridgeBackend>),
    Push(Box<dyn PushBackend>),
    None,
}

impl Backend {
    pub(crate) fn kind(&self) -> BackendKind {
        match self {
            Backend::Bridge(_) => BackendKind::Bridge,
            Backend::Push(_) => BackendKind::Push,
            Backend::None => BackendKind::None,
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Backend({})", self.kind())
    }
}
