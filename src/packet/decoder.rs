//! Incremental frame decoder
//!
//! A byte-at-a-time state machine driven by the transport layer, so the
//! same decoder services blocking and polled transports alike. After a
//! completed or failed frame the machine re-arms to `WaitStart`; the
//! caller never has to reset it to stay live.

use std::mem;

use crate::error::{LinkError, Result};
use super::{DEFAULT_CAPACITY, ETX, FRAME_OVERHEAD, STX};
use super::frame::Packet;

/// Outcome of feeding one byte to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// Mid-frame; feed more bytes
    NotDone,

    /// A full frame was assembled and verified; take it with
    /// [`Decoder::take_packet`]
    Done,
}

/// Decode states, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    WaitStart,
    WaitLength,
    WaitCommand,
    WaitData,
    WaitChecksum,
    WaitEnd,
}

/// Incremental decoder assembling one inbound packet at a time
#[derive(Debug)]
pub struct Decoder {
    state: State,
    packet: Packet,
    complete: Option<Packet>,
    expected_len: usize,
    running_sum: u8,
    capacity: usize,
}

impl Decoder {
    /// Create a decoder with the default packet capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a decoder assembling packets of the given frame capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: State::WaitStart,
            packet: Packet::with_capacity(0, capacity),
            complete: None,
            expected_len: 0,
            running_sum: 0,
            capacity,
        }
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Done)` only after ETX is matched on a frame whose
    /// checksum verified. Framing-byte mismatches, checksum mismatches,
    /// and an over-capacity length all return an error; in every terminal
    /// case the machine has already re-armed to `WaitStart`.
    pub fn process_byte(&mut self, byte: u8) -> Result<DecodeStatus> {
        match self.state {
            State::WaitStart => {
                if byte != STX {
                    self.rearm();
                    return Err(LinkError::Framing(format!(
                        "expected start byte 0x{:02X}, got 0x{:02X}",
                        STX, byte
                    )));
                }
                self.state = State::WaitLength;
                Ok(DecodeStatus::NotDone)
            }

            State::WaitLength => {
                let len = byte as usize;
                let limit = self.capacity.saturating_sub(FRAME_OVERHEAD);
                if len > limit {
                    self.rearm();
                    return Err(LinkError::Capacity(format!(
                        "frame length {} exceeds payload limit of {}",
                        len, limit
                    )));
                }
                self.packet.clear();
                self.expected_len = len;
                self.running_sum = byte;
                self.state = State::WaitCommand;
                Ok(DecodeStatus::NotDone)
            }

            State::WaitCommand => {
                self.packet.set_command(byte);
                self.running_sum = self.running_sum.wrapping_add(byte);
                self.state = if self.expected_len == 0 {
                    State::WaitChecksum
                } else {
                    State::WaitData
                };
                Ok(DecodeStatus::NotDone)
            }

            State::WaitData => {
                // Length was validated against capacity, so this cannot overflow.
                self.packet.append(byte)?;
                self.running_sum = self.running_sum.wrapping_add(byte);
                if self.packet.data().len() == self.expected_len {
                    self.state = State::WaitChecksum;
                }
                Ok(DecodeStatus::NotDone)
            }

            State::WaitChecksum => {
                if byte != self.running_sum {
                    let expected = self.running_sum;
                    self.rearm();
                    return Err(LinkError::Framing(format!(
                        "checksum mismatch: expected 0x{:02X}, got 0x{:02X}",
                        expected, byte
                    )));
                }
                self.state = State::WaitEnd;
                Ok(DecodeStatus::NotDone)
            }

            State::WaitEnd => {
                if byte != ETX {
                    self.rearm();
                    return Err(LinkError::Framing(format!(
                        "expected end byte 0x{:02X}, got 0x{:02X}",
                        ETX, byte
                    )));
                }
                let packet =
                    mem::replace(&mut self.packet, Packet::with_capacity(0, self.capacity));
                self.complete = Some(packet);
                self.rearm();
                Ok(DecodeStatus::Done)
            }
        }
    }

    /// Take the most recently completed packet, if any
    pub fn take_packet(&mut self) -> Option<Packet> {
        self.complete.take()
    }

    /// Borrow the most recently completed packet without taking it
    pub fn peek_packet(&self) -> Option<&Packet> {
        self.complete.as_ref()
    }

    /// True while a frame is partially assembled
    pub fn is_mid_frame(&self) -> bool {
        self.state != State::WaitStart
    }

    /// Drop any partial frame and return to `WaitStart`
    pub fn reset(&mut self) {
        self.rearm();
        self.complete = None;
    }

    fn rearm(&mut self) {
        self.state = State::WaitStart;
        self.packet.clear();
        self.expected_len = 0;
        self.running_sum = 0;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
