//! Packet definition and encoding
//!
//! A `Packet` is one logical message: a command code plus a bounded
//! payload. The buffer capacity is fixed at construction; operations that
//! would grow past it fail rather than truncate.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LinkError, Result};
use super::{DEFAULT_CAPACITY, ETX, FRAME_OVERHEAD, STX};

/// One command or response message with a fixed-capacity payload buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command code (PING, DEBUG, ...)
    command: u8,

    /// Payload bytes, bounded by `capacity - FRAME_OVERHEAD`
    data: Vec<u8>,

    /// Total frame capacity in bytes, framing overhead included
    capacity: usize,
}

impl Packet {
    /// Create an empty packet for the given command with the default capacity
    pub fn new(command: u8) -> Self {
        Self::with_capacity(command, DEFAULT_CAPACITY)
    }

    /// Create an empty packet with an explicit frame capacity
    pub fn with_capacity(command: u8, capacity: usize) -> Self {
        Self {
            command,
            data: Vec::with_capacity(capacity.saturating_sub(FRAME_OVERHEAD)),
            capacity,
        }
    }

    /// The command code
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Set the command code
    pub fn set_command(&mut self, command: u8) {
        self.command = command;
    }

    /// The payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the payload, failing if it does not fit the buffer
    pub fn set_data(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.max_data_len() {
            return Err(LinkError::Capacity(format!(
                "payload of {} bytes exceeds limit of {}",
                data.len(),
                self.max_data_len()
            )));
        }
        self.data.clear();
        self.data.extend_from_slice(data);
        Ok(())
    }

    /// Append a single payload byte, failing if the buffer is full
    pub fn append(&mut self, byte: u8) -> Result<()> {
        if self.data.len() >= self.max_data_len() {
            return Err(LinkError::Capacity(format!(
                "payload limit of {} bytes reached",
                self.max_data_len()
            )));
        }
        self.data.push(byte);
        Ok(())
    }

    /// Total frame capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Largest payload this packet can carry.
    /// The length field is a single byte, so 255 bounds it even when the
    /// buffer is larger.
    pub fn max_data_len(&self) -> usize {
        self.capacity.saturating_sub(FRAME_OVERHEAD).min(u8::MAX as usize)
    }

    /// Reset to an empty payload so the buffer can carry the next message
    pub fn clear(&mut self) {
        self.command = 0;
        self.data.clear();
    }

    /// Additive checksum (mod 256) over Len, Cmd, and the payload
    pub fn checksum(&self) -> u8 {
        let mut sum = (self.data.len() as u8).wrapping_add(self.command);
        for &byte in &self.data {
            sum = sum.wrapping_add(byte);
        }
        sum
    }

    /// Serialize to the wire frame: STX, Len, Cmd, payload, Sum, ETX.
    ///
    /// Always `data.len() + 5` bytes; the payload bound was enforced when
    /// the payload was written, so encoding itself cannot overflow.
    pub fn encode(&self) -> Bytes {
        let mut frame = BytesMut::with_capacity(self.data.len() + FRAME_OVERHEAD);
        frame.put_u8(STX);
        frame.put_u8(self.data.len() as u8);
        frame.put_u8(self.command);
        frame.extend_from_slice(&self.data);
        frame.put_u8(self.checksum());
        frame.put_u8(ETX);
        frame.freeze()
    }
}
