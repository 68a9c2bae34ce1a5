//! Backend interfaces
//!
//! A tracker binds at most one backend for its whole lifetime. Transport
//! details (handshakes, framing, subscriptions) live behind these traits.

mod factory;

pub use factory::{BackendFactory, NoBackends};

use std::time::Duration;
use trackerkit_core::{MemoryWidth, PushState, Result, SlotInfo, VariableUpdate, Watch};

/// Bridge backend interface
///
/// A bridge keeps a persistent link to an intermediary process which
/// relays memory reads to a console or emulator. Reads are served from the
/// bridge's local cache of watched ranges; they never block on the wire.
pub trait BridgeBackend: Send {
    /// Attempt or maintain the transport link
    fn connect(&mut self) -> Result<()>;

    /// Run one protocol cycle. Returns true if anything new was learned,
    /// including a change in link or console status since the last cycle.
    fn poll_once(&mut self) -> bool;

    /// Whether the transport link to the bridge is up
    fn is_link_up(&self) -> bool;

    /// Whether the bridge confirmed a console is attached
    fn is_console_reachable(&self) -> bool;

    /// Copy cached bytes starting at `addr` into `buf`.
    ///
    /// Bytes the bridge has not fetched yet read as zero.
    fn read(&self, addr: u32, buf: &mut [u8]);

    /// Read a single cached byte
    fn read_u8(&self, addr: u32) -> u8 {
        let mut buf = [0u8; 1];
        self.read(addr, &mut buf);
        buf[0]
    }

    /// Read a little-endian integer of the given width
    fn read_int(&self, addr: u32, width: MemoryWidth) -> u32 {
        let mut buf = [0u8; 4];
        let len = width.bytes() as usize;
        self.read(addr, &mut buf[..len]);
        width.decode_le(&buf[..len])
    }

    /// Include a range in future refresh cycles
    fn add_watch(&mut self, watch: Watch);

    /// Drop a previously registered range
    fn remove_watch(&mut self, watch: Watch);

    /// Hint how often watched ranges should be refreshed
    fn set_update_interval(&mut self, interval: Duration);

    /// Invalidate all cached memory
    fn clear_cache(&mut self);

    /// Whether `shutdown` may block, e.g. waiting out a socket timeout
    fn may_block_on_exit(&self) -> bool {
        false
    }

    /// Close the link and release resources
    fn shutdown(&mut self) {}
}

/// Called when a push backend announces its slots.
///
/// Returning `Some(slot)` asks the backend to resynchronize that slot
/// before it delivers any further variable batches.
pub type InfoHandler = Box<dyn Fn(&SlotInfo) -> Option<String> + Send + Sync>;

/// Called with each batch of variable updates, in arrival order.
pub type VarHandler = Box<dyn Fn(&[VariableUpdate]) + Send + Sync>;

/// Push backend interface
///
/// A push backend receives unsolicited variable updates from a remote
/// source. Handlers may be invoked on any thread the backend chooses.
///
/// Whenever the info handler returns `Some(slot)`, the backend must run its
/// own [`sync`](PushBackend::sync) for that slot before handing further
/// batches to the variable handler. The tracker never issues that sync
/// itself, so a backend that ignores the return value leaves the selected
/// slot without its initial values.
pub trait PushBackend: Send {
    /// Attempt or maintain the link
    fn connect(&mut self) -> Result<()>;

    /// Run one protocol cycle. Returns true if anything new was learned.
    fn poll_once(&mut self) -> bool;

    /// Current link state
    fn state(&self) -> PushState;

    /// Request a full resynchronization of `slot`
    fn sync(&mut self, slot: &str);

    /// Install the slot announcement handler, replacing any previous one.
    ///
    /// A `Some(slot)` result from the handler obliges the backend to call
    /// `sync(slot)` before the next variable batch.
    fn set_info_handler(&mut self, handler: InfoHandler);

    /// Install the variable batch handler, replacing any previous one
    fn set_var_handler(&mut self, handler: VarHandler);

    /// Whether `shutdown` may block
    fn may_block_on_exit(&self) -> bool {
        false
    }

    /// Close the link and release resources
    fn shutdown(&mut self) {}
}
