//! Outbound requests from the console-side master.

use crate::constants::*;
use crate::packet::checksum;

/// One outbound frame: a get or set targeting a single variable.
///
/// All requests are sent with the master device id; values are encoded
/// little-endian and the trailing checksum is filled in on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Read a variable.
    Get {
        /// Variable index.
        index: u8,
    },

    /// Write an 8-bit variable.
    Set8 {
        /// Variable index.
        index: u8,
        /// Value.
        value: u8,
    },

    /// Write a 16-bit variable.
    Set16 {
        /// Variable index.
        index: u8,
        /// Value, little-endian on the wire.
        value: u16,
    },

    /// Write a 32-bit variable.
    Set32 {
        /// Variable index.
        index: u8,
        /// Value, little-endian on the wire.
        value: u32,
    },
}

impl Request {
    /// The targeted variable index.
    pub fn index(&self) -> u8 {
        match *self {
            Request::Get { index }
            | Request::Set8 { index, .. }
            | Request::Set16 { index, .. }
            | Request::Set32 { index, .. } => index,
        }
    }

    /// Encode the request to wire bytes, checksum included.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_FRAME_LEN + 5);
        match *self {
            Request::Get { index } => {
                buf.extend_from_slice(&[MASTER_ID, DIR_READ, 1, index]);
            }
            Request::Set8 { index, value } => {
                buf.extend_from_slice(&[MASTER_ID, DIR_WRITE, 2, index, value]);
            }
            Request::Set16 { index, value } => {
                buf.extend_from_slice(&[MASTER_ID, DIR_WRITE, 3, index]);
                buf.extend_from_slice(&value.to_le_bytes());
            }
            Request::Set32 { index, value } => {
                buf.extend_from_slice(&[MASTER_ID, DIR_WRITE, 5, index]);
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        buf.push(checksum(&buf));
        buf
    }
}
