//! Data models for connection state, memory addressing, and push variables
//!
//! This module provides:
//! - The three-level tracker connection state
//! - The push backend's own reported link state
//! - Memory widths and watch ranges for the 24-bit address space
//! - Slot and variable records delivered by the push backend

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::MemoryError;

/// Highest addressable byte in the console address space.
pub const MAX_ADDRESS: u32 = 0xFF_FFFF;

/// Size of the console address space in bytes.
pub const ADDRESS_LIMIT: u64 = MAX_ADDRESS as u64 + 1;

/// Tracker connection state
///
/// Ordered by capability: a state compares greater than every state that
/// offers less. Only backend polling moves the tracker between states.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ConnectionState {
    /// No transport link
    #[default]
    Disconnected,
    /// Transport link is up, console not confirmed reachable
    BridgeConnected,
    /// Transport link is up and the console is reachable
    ConsoleConnected,
}

impl ConnectionState {
    /// Derive the state from a bridge backend's two connectivity flags.
    ///
    /// `console_reachable` is only meaningful while the link is up.
    pub fn from_link(link_up: bool, console_reachable: bool) -> Self {
        match (link_up, console_reachable) {
            (true, true) => Self::ConsoleConnected,
            (true, false) => Self::BridgeConnected,
            (false, _) => Self::Disconnected,
        }
    }

    /// Whether memory content is meaningful in this state
    pub fn has_console(&self) -> bool {
        matches!(self, Self::ConsoleConnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::BridgeConnected => write!(f, "Bridge Connected"),
            Self::ConsoleConnected => write!(f, "Console Connected"),
        }
    }
}

/// Link state reported by a push backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PushState {
    /// No socket
    #[default]
    Disconnected,
    /// Socket open, no game attached on the remote side
    SocketConnected,
    /// Socket open and a game is reporting variables
    GameConnected,
}

impl From<PushState> for ConnectionState {
    fn from(state: PushState) -> Self {
        match state {
            PushState::GameConnected => ConnectionState::ConsoleConnected,
            PushState::SocketConnected => ConnectionState::BridgeConnected,
            PushState::Disconnected => ConnectionState::Disconnected,
        }
    }
}

/// Width of a typed integer read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryWidth {
    /// One byte
    U8,
    /// Two bytes, little-endian
    U16,
    /// Three bytes, little-endian
    U24,
    /// Four bytes, little-endian
    U32,
}

impl MemoryWidth {
    /// Number of bytes covered by this width
    pub fn bytes(&self) -> u32 {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U24 => 3,
            Self::U32 => 4,
        }
    }

    /// Compose a little-endian integer from up to four bytes.
    ///
    /// Missing trailing bytes count as zero.
    pub fn decode_le(&self, bytes: &[u8]) -> u32 {
        bytes
            .iter()
            .take(self.bytes() as usize)
            .enumerate()
            .fold(0u32, |acc, (i, b)| acc | (u32::from(*b) << (8 * i)))
    }
}

impl fmt::Display for MemoryWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.bytes() * 8)
    }
}

/// A byte range registered for inclusion in a bridge backend's refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Watch {
    /// Start address
    pub addr: u32,
    /// Length in bytes
    pub len: u32,
}

impl Watch {
    /// Validate and create a watch range.
    ///
    /// The start address must lie inside the 24-bit address space and the
    /// length must be at least one byte.
    pub fn new(addr: u32, len: u32) -> Result<Self, MemoryError> {
        check_address(u64::from(addr))?;
        if len == 0 {
            return Err(MemoryError::InvalidLength { addr, len });
        }
        Ok(Self { addr, len })
    }

    /// Watch covering a single typed value
    pub fn for_width(addr: u32, width: MemoryWidth) -> Result<Self, MemoryError> {
        Self::new(addr, width.bytes())
    }

    /// Whether this range covers `addr`
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.addr && u64::from(addr) < u64::from(self.addr) + u64::from(self.len)
    }
}

impl fmt::Display for Watch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:06X}+{}", self.addr, self.len)
    }
}

/// Check that an address lies inside the 24-bit address space.
///
/// Takes a `u64` so that segment arithmetic can be validated without
/// wrapping.
pub fn check_address(addr: u64) -> Result<u32, MemoryError> {
    if addr > u64::from(MAX_ADDRESS) {
        return Err(MemoryError::AddressOutOfRange { addr });
    }
    Ok(addr as u32)
}

/// Slot list announced by a push backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Available slots, in the order the remote reported them
    pub slots: Vec<String>,
}

impl SlotInfo {
    /// Create slot info from any list of names
    pub fn new<I, S>(slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    /// The slot a tracker selects: always the first one reported
    pub fn first(&self) -> Option<&str> {
        self.slots.first().map(String::as_str)
    }
}

/// A single variable update pushed by the remote side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableUpdate {
    /// Slot this update belongs to
    pub slot: String,
    /// Variable name
    pub name: String,
    /// New value
    pub value: Value,
}

impl VariableUpdate {
    /// Create a variable update
    pub fn new(slot: impl Into<String>, name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            slot: slot.into(),
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_link() {
        assert_eq!(
            ConnectionState::from_link(false, false),
            ConnectionState::Disconnected
        );
        assert_eq!(
            ConnectionState::from_link(false, true),
            ConnectionState::Disconnected
        );
        assert_eq!(
            ConnectionState::from_link(true, false),
            ConnectionState::BridgeConnected
        );
        assert_eq!(
            ConnectionState::from_link(true, true),
            ConnectionState::ConsoleConnected
        );
    }

    #[test]
    fn test_state_ordering() {
        assert!(ConnectionState::Disconnected < ConnectionState::BridgeConnected);
        assert!(ConnectionState::BridgeConnected < ConnectionState::ConsoleConnected);
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_push_state_mapping() {
        assert_eq!(
            ConnectionState::from(PushState::GameConnected),
            ConnectionState::ConsoleConnected
        );
        assert_eq!(
            ConnectionState::from(PushState::SocketConnected),
            ConnectionState::BridgeConnected
        );
        assert_eq!(
            ConnectionState::from(PushState::Disconnected),
            ConnectionState::Disconnected
        );
    }

    #[test]
    fn test_decode_le() {
        let bytes = [0x34, 0x12, 0xcd, 0xab];
        assert_eq!(MemoryWidth::U8.decode_le(&bytes), 0x34);
        assert_eq!(MemoryWidth::U16.decode_le(&bytes), 0x1234);
        assert_eq!(MemoryWidth::U24.decode_le(&bytes), 0xcd1234);
        assert_eq!(MemoryWidth::U32.decode_le(&bytes), 0xabcd1234);
        assert_eq!(MemoryWidth::U32.decode_le(&[0x01]), 0x01);
    }

    #[test]
    fn test_watch_validation() {
        assert!(Watch::new(MAX_ADDRESS, 1).is_ok());
        assert_eq!(
            Watch::new(MAX_ADDRESS + 1, 1),
            Err(MemoryError::AddressOutOfRange {
                addr: ADDRESS_LIMIT
            })
        );
        assert_eq!(
            Watch::new(0x10, 0),
            Err(MemoryError::InvalidLength { addr: 0x10, len: 0 })
        );
    }

    #[test]
    fn test_watch_contains() {
        let watch = Watch::for_width(0x100, MemoryWidth::U24).unwrap();
        assert!(!watch.contains(0xff));
        assert!(watch.contains(0x100));
        assert!(watch.contains(0x102));
        assert!(!watch.contains(0x103));
        assert_eq!(watch.to_string(), "$000100+3");
    }

    #[test]
    fn test_slot_info_first() {
        assert_eq!(SlotInfo::new(["P1", "P2"]).first(), Some("P1"));
        assert_eq!(SlotInfo::default().first(), None);
    }
}
