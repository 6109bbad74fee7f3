//! Packet Module
//!
//! Framing and incremental decoding for the wire protocol. The same code
//! runs on both ends of the link; only the transport underneath differs.
//!
//! ## Frame Format
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────┬──────────┬──────────┐
//! │ STX (1)  │ Len (1)  │ Cmd (1)  │   Payload   │ Sum (1)  │ ETX (1)  │
//! └──────────┴──────────┴──────────┴─────────────┴──────────┴──────────┘
//! ```
//!
//! - STX = 0x02, ETX = 0x03
//! - Len is the payload length, so a frame is Len + 5 bytes on the wire
//! - Sum is an additive checksum (mod 256) over Len, Cmd, and the payload
//!
//! The additive checksum keeps validation cheap on 8-bit peers. A stray
//! STX inside the payload is not a resync point; payload bytes are
//! unconstrained values.

mod decoder;
mod frame;
mod packer;

pub use decoder::{DecodeStatus, Decoder};
pub use frame::Packet;
pub use packer::{Packer, Unpacker};

/// Start-of-frame byte
pub const STX: u8 = 0x02;

/// End-of-frame byte
pub const ETX: u8 = 0x03;

/// Bytes of framing overhead per frame: STX, Len, Cmd, Sum, ETX
pub const FRAME_OVERHEAD: usize = 5;

/// Default packet buffer capacity, framing overhead included
pub const DEFAULT_CAPACITY: usize = 256;
