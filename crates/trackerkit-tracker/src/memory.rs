//! Memory access over a bridge backend
//!
//! All requests are validated against the 24-bit address space before they
//! reach the backend. Addresses are taken as `u64` so segment arithmetic
//! cannot wrap into range.
//!
//! # Watch-on-zero
//!
//! A bridge only refreshes ranges that are watched, and unfetched bytes read
//! as zero. A zero result is therefore ambiguous: the byte may really be
//! zero, or it may never have been fetched. [`read_and_watch`] resolves
//! the ambiguity optimistically by registering a watch for every zero read,
//! so a later read reflects live memory. Addresses that really hold zero
//! end up watched as well. Callers must tolerate stale zeros right after
//! first touching an address. [`peek`] reads without this side effect.

use trackerkit_communication::BridgeBackend;
use trackerkit_core::{check_address, MemoryError, MemoryWidth, Watch, ADDRESS_LIMIT};

/// Read a typed value without touching the watch list
pub fn peek(
    bridge: &dyn BridgeBackend,
    addr: u64,
    width: MemoryWidth,
) -> Result<u32, MemoryError> {
    let addr = check_address(addr)?;
    Ok(match width {
        MemoryWidth::U8 => u32::from(bridge.read_u8(addr)),
        _ => bridge.read_int(addr, width),
    })
}

/// Read a typed value, watching its range if the read returned zero
pub fn read_and_watch(
    bridge: &mut dyn BridgeBackend,
    addr: u64,
    width: MemoryWidth,
) -> Result<u32, MemoryError> {
    let value = peek(bridge, addr, width)?;
    if value == 0 {
        let watch = Watch::for_width(addr as u32, width)?;
        tracing::trace!("Zero read at {}, watching", watch);
        bridge.add_watch(watch);
    }
    Ok(value)
}

/// Bulk read of `len` bytes starting at `addr`.
///
/// The result is truncated at the end of the address space. No watch is
/// registered.
pub fn read_raw(
    bridge: &dyn BridgeBackend,
    addr: u64,
    len: u32,
) -> Result<Vec<u8>, MemoryError> {
    let start = check_address(addr)?;
    let len = u64::from(len).min(ADDRESS_LIMIT - u64::from(start)) as usize;
    let mut buf = vec![0u8; len];
    if len > 0 {
        bridge.read(start, &mut buf);
    }
    Ok(buf)
}

/// Register a range for the backend's refresh cycle
pub fn add_watch(
    bridge: &mut dyn BridgeBackend,
    addr: u64,
    len: u32,
) -> Result<Watch, MemoryError> {
    let watch = Watch::new(check_address(addr)?, len)?;
    bridge.add_watch(watch);
    Ok(watch)
}

/// Remove a range from the backend's refresh cycle
pub fn remove_watch(
    bridge: &mut dyn BridgeBackend,
    addr: u64,
    len: u32,
) -> Result<Watch, MemoryError> {
    let watch = Watch::new(check_address(addr)?, len)?;
    bridge.remove_watch(watch);
    Ok(watch)
}
