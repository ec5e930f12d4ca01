//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the bus protocol.
///
/// Malformed frames on the wire are not errors: the bus is a partially
/// reverse-engineered, occasionally noisy format and the engine reports and
/// recovers from bad frames instead of failing. Only conditions that need
/// explicit recovery by the caller are represented here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The burst buffer filled up before an idle gap was seen.
    #[error("burst buffer overflow: {capacity} bytes accumulated without a frame boundary")]
    BufferOverflow {
        /// Buffer capacity that was exhausted.
        capacity: usize,
    },

    /// A frame's trailing checksum did not match its content.
    #[error("checksum mismatch: expected 0x{expected:02x}, got 0x{actual:02x}")]
    ChecksumMismatch {
        /// Checksum computed over the frame content.
        expected: u8,
        /// Checksum byte found on the wire.
        actual: u8,
    },
}
