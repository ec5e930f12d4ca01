//! Burst accumulation.
//!
//! The bus defines no frame delimiter. Bytes are collected one at a time and
//! a burst boundary is inferred by the caller from inter-byte timing: an idle
//! gap of [`IDLE_GAP`] or more means the buffered run is complete and can be
//! handed off for frame extraction. Resynchronization after corruption
//! relies entirely on declared length plus checksum, with inter-burst
//! silence as the recovery point.

use std::time::Duration;

use bytes::{BufMut, BytesMut};

use crate::constants::TURN_MARKER;
use crate::error::ProtocolError;

/// Inter-byte delay that marks a burst boundary.
pub const IDLE_GAP: Duration = Duration::from_millis(25);

/// Maximum number of bytes accumulated between burst boundaries.
pub const BURST_CAPACITY: usize = 128;

/// Accumulates raw bus bytes into bursts.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buf: BytesMut,
}

impl FrameAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        FrameAssembler {
            buf: BytesMut::with_capacity(BURST_CAPACITY),
        }
    }

    /// Append one received byte to the current burst.
    ///
    /// If the buffer is already full the accumulated run is discarded, the
    /// byte is dropped, and resynchronization starts from the next byte.
    pub fn push(&mut self, byte: u8) -> Result<(), ProtocolError> {
        if self.buf.len() >= BURST_CAPACITY {
            self.buf.clear();
            return Err(ProtocolError::BufferOverflow {
                capacity: BURST_CAPACITY,
            });
        }
        self.buf.put_u8(byte);
        Ok(())
    }

    /// Number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the current burst is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Take the accumulated burst, leaving the assembler empty.
    pub fn take_burst(&mut self) -> BytesMut {
        self.buf.split()
    }

    /// Whether the burst so far is exactly the transmit-turn marker.
    ///
    /// The marker is checked as soon as its 4th byte arrives, mid-burst; it
    /// signals that the master may issue its next request.
    pub fn at_turn_marker(&self) -> bool {
        self.buf.len() == TURN_MARKER.len() && self.buf[..] == TURN_MARKER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_burst_resets() {
        let mut asm = FrameAssembler::new();
        for b in [0x10u8, 0x00, 0x00, 0x11] {
            asm.push(b).unwrap();
        }
        assert_eq!(asm.len(), 4);
        let burst = asm.take_burst();
        assert_eq!(&burst[..], &[0x10, 0x00, 0x00, 0x11]);
        assert!(asm.is_empty());
    }

    #[test]
    fn test_turn_marker_detection() {
        let mut asm = FrameAssembler::new();
        for b in TURN_MARKER {
            assert!(!asm.at_turn_marker());
            asm.push(b).unwrap();
        }
        assert!(asm.at_turn_marker());

        // A longer burst starting with the marker is not a marker.
        asm.push(0x00).unwrap();
        assert!(!asm.at_turn_marker());
    }

    #[test]
    fn test_overflow_discards_and_resyncs() {
        let mut asm = FrameAssembler::new();
        for _ in 0..BURST_CAPACITY {
            asm.push(0xee).unwrap();
        }
        let err = asm.push(0xee).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::BufferOverflow {
                capacity: BURST_CAPACITY
            }
        );
        // The buffer was discarded; the next byte starts a fresh burst.
        assert!(asm.is_empty());
        asm.push(0x13).unwrap();
        assert_eq!(asm.len(), 1);
    }
}
