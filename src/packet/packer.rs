//! Typed payload packing and unpacking
//!
//! Multi-byte fields cross the wire little-endian to match the embedded
//! peers. Strings carry a NUL terminator so C firmware can consume them
//! in place.

use crate::error::{LinkError, Result};
use super::frame::Packet;

/// Appends typed fields to a packet payload
pub struct Packer<'a> {
    packet: &'a mut Packet,
}

impl<'a> Packer<'a> {
    pub fn new(packet: &'a mut Packet) -> Self {
        Self { packet }
    }

    /// Append a single byte
    pub fn pack_u8(&mut self, value: u8) -> Result<()> {
        self.packet.append(value)
    }

    /// Append a u16, little-endian
    pub fn pack_u16(&mut self, value: u16) -> Result<()> {
        self.pack_bytes(&value.to_le_bytes())
    }

    /// Append a u32, little-endian
    pub fn pack_u32(&mut self, value: u32) -> Result<()> {
        self.pack_bytes(&value.to_le_bytes())
    }

    /// Append raw bytes
    pub fn pack_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.packet.append(byte)?;
        }
        Ok(())
    }

    /// Append a string with a NUL terminator
    pub fn pack_str(&mut self, value: &str) -> Result<()> {
        self.pack_bytes(value.as_bytes())?;
        self.packet.append(0)
    }
}

/// Reads typed fields out of a payload slice
pub struct Unpacker<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read a single byte
    pub fn unpack_u8(&mut self) -> Result<u8> {
        let bytes = self.unpack_bytes(1)?;
        Ok(bytes[0])
    }

    /// Read a u16, little-endian
    pub fn unpack_u16(&mut self) -> Result<u16> {
        let bytes = self.unpack_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a u32, little-endian
    pub fn unpack_u32(&mut self) -> Result<u32> {
        let bytes = self.unpack_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read exactly `count` raw bytes
    pub fn unpack_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(LinkError::Protocol(format!(
                "payload underrun: needed {} bytes, {} left",
                count,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    /// Read a NUL-terminated string
    pub fn unpack_str(&mut self) -> Result<&'a str> {
        let rest = &self.data[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| LinkError::Protocol("unterminated string in payload".to_string()))?;
        let s = std::str::from_utf8(&rest[..nul])
            .map_err(|e| LinkError::Protocol(format!("invalid UTF-8 in payload: {}", e)))?;
        self.pos += nul + 1;
        Ok(s)
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// True once the whole payload has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
