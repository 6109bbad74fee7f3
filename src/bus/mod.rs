//! Bus Module
//!
//! The pluggable transport carrying frames as raw bytes.
//!
//! ## Architecture
//! - One capability interface, [`Bus`]
//! - Two implementations selected at construction: [`SocketBus`] (TCP)
//!   and [`SerialBus`] (character device)
//! - Each bus owns its transport handle and the receive-side decoder, so
//!   upstream code only ever sees completed packets
//!
//! The client and server loops are written against `&mut dyn Bus` and
//! never learn which transport is underneath.

mod serial;
mod socket;

pub use serial::SerialBus;
pub use socket::{SocketBus, DEFAULT_PORT};

use crate::error::Result;
use crate::packet::{DecodeStatus, Packet};

/// Transport abstraction: write one packet, pull bytes toward the next
pub trait Bus {
    /// Encode and transmit a packet
    fn write_packet(&mut self, packet: &Packet) -> Result<()>;

    /// Pull at most one byte from the transport (bounded wait) and feed
    /// it to the receive-side decoder.
    ///
    /// `Ok(NotDone)` covers both "byte consumed, frame incomplete" and
    /// "no byte available yet", so the caller's poll loop is identical
    /// for blocking and polled transports.
    fn process_byte(&mut self) -> Result<DecodeStatus>;

    /// Take the completed inbound packet after `process_byte` returned
    /// [`DecodeStatus::Done`]
    fn take_packet(&mut self) -> Option<Packet>;

    /// Enable or disable byte-level TX/RX tracing for this bus only
    fn set_debug(&mut self, on: bool);

    /// True while the underlying transport is open
    fn is_connected(&self) -> bool;

    /// Release the transport handle
    fn close(&mut self) -> Result<()>;
}
