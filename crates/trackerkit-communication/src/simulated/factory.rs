//! Factory handing out simulated backends

use crate::backend::{BackendFactory, BridgeBackend, PushBackend};

use super::{SimulatedBridge, SimulatedPush};

/// Factory that hands out clones of its simulated backends
///
/// The factory keeps its own clones, so everything a tracker does to the
/// backend it was given stays observable through [`SimulatedFactory::bridge`]
/// and [`SimulatedFactory::push`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedFactory {
    bridge: Option<SimulatedBridge>,
    push: Option<SimulatedPush>,
}

impl SimulatedFactory {
    /// Factory providing both kinds of backend
    pub fn new() -> Self {
        Self {
            bridge: Some(SimulatedBridge::new()),
            push: Some(SimulatedPush::new()),
        }
    }

    /// Factory providing the given backends
    pub fn with_backends(bridge: SimulatedBridge, push: SimulatedPush) -> Self {
        Self {
            bridge: Some(bridge),
            push: Some(push),
        }
    }

    /// Factory providing only the given bridge
    pub fn with_bridge(bridge: SimulatedBridge) -> Self {
        Self {
            bridge: Some(bridge),
            push: None,
        }
    }

    /// Factory providing only the given push backend
    pub fn with_push(push: SimulatedPush) -> Self {
        Self {
            bridge: None,
            push: Some(push),
        }
    }

    /// Handle to the bridge this factory hands out
    pub fn bridge(&self) -> Option<&SimulatedBridge> {
        self.bridge.as_ref()
    }

    /// Handle to the push backend this factory hands out
    pub fn push(&self) -> Option<&SimulatedPush> {
        self.push.as_ref()
    }
}

impl BackendFactory for SimulatedFactory {
    fn create_bridge(&self, display_name: &str) -> Option<Box<dyn BridgeBackend>> {
        let bridge = self.bridge.clone()?;
        bridge.set_display_name(display_name);
        Some(Box::new(bridge))
    }

    fn create_push(&self) -> Option<Box<dyn PushBackend>> {
        let push = self.push.clone()?;
        Some(Box::new(push))
    }
}
