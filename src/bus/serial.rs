//! Serial transport
//!
//! Character-device bus configured 8-N-1, raw, no flow control. Once
//! open, `process_byte` behaves byte-for-byte like the socket bus, so
//! upstream code never sees which transport it is on.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{LinkError, Result};
use crate::packet::{DecodeStatus, Decoder, Packet, DEFAULT_CAPACITY};
use crate::util::hex_dump;
use super::Bus;

/// Upper bound on one `process_byte` wait
const READ_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Bus over a serial character device
pub struct SerialBus {
    port: Option<Box<dyn SerialPort>>,
    decoder: Decoder,
    debug: bool,
    device: String,
}

impl SerialBus {
    /// Open and configure a serial device at the given baud rate
    pub fn open(device: &str, baud_rate: u32) -> Result<Self> {
        Self::open_with_capacity(device, baud_rate, DEFAULT_CAPACITY)
    }

    /// Open with an explicit packet capacity
    pub fn open_with_capacity(device: &str, baud_rate: u32, capacity: usize) -> Result<Self> {
        let port = serialport::new(device, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_POLL_TIMEOUT)
            .open()?;
        tracing::debug!("opened {} at {} baud", device, baud_rate);

        Ok(Self {
            port: Some(port),
            decoder: Decoder::with_capacity(capacity),
            debug: false,
            device: device.to_string(),
        })
    }

    /// Names of serial devices present on this machine
    pub fn list_ports() -> Result<Vec<String>> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    /// Device path for logging
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Bus for SerialBus {
    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
        let frame = packet.encode();
        if self.debug {
            tracing::debug!(
                device = %self.device,
                "TX {} bytes\n{}",
                frame.len(),
                hex_dump(&frame)
            );
        }
        port.write_all(&frame)?;
        port.flush()?;
        Ok(())
    }

    fn process_byte(&mut self) -> Result<DecodeStatus> {
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
        let mut byte = [0u8; 1];
        match port.read(&mut byte) {
            // Unlike TCP, a zero-byte read on a serial device is an empty
            // poll window, not a closed peer.
            Ok(0) => Ok(DecodeStatus::NotDone),
            Ok(_) => {
                let status = self.decoder.process_byte(byte[0])?;
                if status == DecodeStatus::Done && self.debug {
                    if let Some(packet) = self.decoder.peek_packet() {
                        tracing::debug!(
                            device = %self.device,
                            command = packet.command(),
                            "RX {} payload bytes\n{}",
                            packet.data().len(),
                            hex_dump(packet.data())
                        );
                    }
                }
                Ok(status)
            }
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::TimedOut =>
            {
                Ok(DecodeStatus::NotDone)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn take_packet(&mut self) -> Option<Packet> {
        self.decoder.take_packet()
    }

    fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            tracing::debug!("closed {}", self.device);
        }
        Ok(())
    }
}
