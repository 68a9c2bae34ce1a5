//! Error handling for TrackerKit
//!
//! Provides error types for the layers below the tracker facade:
//! - Backend errors (transport/link failures reported by a backend)
//! - Memory errors (address and length validation)
//!
//! The facade itself never surfaces these to hosts; it degrades every
//! failure to an inert sentinel result and logs the cause.

use thiserror::Error;

/// Backend error type
///
/// Represents failures reported by a bridge or push backend while
/// establishing or maintaining its link.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend has no link to its remote end
    #[error("Backend not connected")]
    NotConnected,

    /// Connection attempt failed
    #[error("Failed to connect to {endpoint}: {reason}")]
    ConnectFailed {
        /// The endpoint the backend tried to reach.
        endpoint: String,
        /// The reason the attempt failed.
        reason: String,
    },
}

/// Memory access error type
///
/// Produced while validating a memory request against the 24-bit
/// address space before it is forwarded to the bridge backend.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    /// Address lies outside the 24-bit address space
    #[error("Address ${addr:X} outside of 24-bit address space")]
    AddressOutOfRange {
        /// The rejected address.
        addr: u64,
    },

    /// Range length cannot describe any bytes
    #[error("Invalid range length {len} at ${addr:06X}")]
    InvalidLength {
        /// The start address of the range.
        addr: u32,
        /// The rejected length.
        len: u32,
    },

    /// No bridge backend is bound to the tracker
    #[error("No memory backend bound")]
    NoBackend,
}

/// Main error type for TrackerKit
///
/// Returned by backend operations that can fail, such as `connect`.
#[derive(Error, Debug)]
pub enum Error {
    /// Backend error
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_error_display() {
        let err = MemoryError::AddressOutOfRange { addr: 0x1000000 };
        assert_eq!(
            err.to_string(),
            "Address $1000000 outside of 24-bit address space"
        );

        let err = MemoryError::InvalidLength { addr: 0x7e0010, len: 0 };
        assert_eq!(err.to_string(), "Invalid range length 0 at $7E0010");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err: Error = BackendError::ConnectFailed {
            endpoint: "ws://localhost:8080".to_string(),
            reason: "refused".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Failed to connect to ws://localhost:8080: refused"
        );
        assert!(matches!(err, Error::Backend(BackendError::ConnectFailed { .. })));
    }
}
