//! Helios KWL serial bus protocol.
//!
//! This crate provides types and utilities for the half-duplex serial bus of
//! the Helios KWL EC 270/370 Pro ventilation controller. The bus carries one
//! generic checksummed envelope in both directions:
//!
//! ```text
//! +------+-----------+--------+------------------+----------+
//! | id   | direction | len N  | payload[0..N]    | checksum |
//! +------+-----------+--------+------------------+----------+
//! ```
//!
//! There are no frame delimiters; burst boundaries are inferred from
//! inter-byte timing and resynchronization relies on declared length plus
//! checksum. Traffic is either:
//!
//! - **Requests** (master → device): GET (N=1) and SET (N=2/3/5) frames
//! - **Status snapshots** (device → master): write-direction frames decoded
//!   by (variable index, exact length)
//! - **Broadcast status** (unsolicited): a fixed 27-byte summary frame
//!
//! The literal 4-byte sequence `0x13 0x00 0x00 0x14` on the wire marks a
//! window in which the master may transmit exactly one request.

mod assembler;
mod constants;
mod error;
mod packet;
mod request;
mod update;

pub use assembler::*;
pub use constants::*;
pub use error::*;
pub use packet::*;
pub use request::*;
pub use update::*;
