//! TCP transport
//!
//! Client-side connect plus an accepted-stream mode so the peer end of a
//! connection runs the identical packet logic.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{LinkError, Result};
use crate::packet::{DecodeStatus, Decoder, Packet, DEFAULT_CAPACITY};
use crate::util::hex_dump;
use super::Bus;

/// Default TCP port for devlink peers
pub const DEFAULT_PORT: u16 = 8888;

/// Upper bound on one `process_byte` wait, keeping the receive loop a
/// cooperative poll rather than an unbounded block
const READ_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Bus over a TCP connection
pub struct SocketBus {
    stream: Option<TcpStream>,
    decoder: Decoder,
    debug: bool,
    peer_addr: String,
}

impl SocketBus {
    /// Resolve `host:port` and open a client connection
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with_capacity(host, port, DEFAULT_CAPACITY)
    }

    /// Client connection with an explicit packet capacity
    pub fn connect_with_capacity(host: &str, port: u16, capacity: usize) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| LinkError::Config(format!("no address found for {}:{}", host, port)))?;
        let stream = TcpStream::connect(addr)?;
        tracing::debug!("connected to {}", addr);
        Self::from_stream_with_capacity(stream, capacity)
    }

    /// Wrap an accepted connection (the peer side of the link)
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        Self::from_stream_with_capacity(stream, DEFAULT_CAPACITY)
    }

    /// Accepted connection with an explicit packet capacity
    pub fn from_stream_with_capacity(stream: TcpStream, capacity: usize) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Low latency matters more than throughput for single-packet
        // request/response traffic.
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(READ_POLL_TIMEOUT))?;

        Ok(Self {
            stream: Some(stream),
            decoder: Decoder::with_capacity(capacity),
            debug: false,
            peer_addr,
        })
    }

    /// Peer address string for logging
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Bus for SocketBus {
    fn write_packet(&mut self, packet: &Packet) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
        let frame = packet.encode();
        if self.debug {
            tracing::debug!(
                peer = %self.peer_addr,
                "TX {} bytes\n{}",
                frame.len(),
                hex_dump(&frame)
            );
        }
        stream.write_all(&frame)?;
        stream.flush()?;
        Ok(())
    }

    fn process_byte(&mut self) -> Result<DecodeStatus> {
        let stream = self.stream.as_mut().ok_or(LinkError::NotConnected)?;
        let mut byte = [0u8; 1];
        match stream.read(&mut byte) {
            // A zero-byte read on TCP means the peer closed the connection.
            Ok(0) => Err(LinkError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            ))),
            Ok(_) => {
                let status = self.decoder.process_byte(byte[0])?;
                if status == DecodeStatus::Done && self.debug {
                    if let Some(packet) = self.decoder.peek_packet() {
                        tracing::debug!(
                            peer = %self.peer_addr,
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
        self.stream.is_some()
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!("closed connection to {}", self.peer_addr);
        }
        Ok(())
    }
}
