//! Client orchestration
//!
//! Builds a request, hands it to the bus, then pumps the bus's byte loop
//! until a response frame completes, an error surfaces, or the deadline
//! passes. One request is in flight at a time.

use std::thread;
use std::time::Instant;

use crate::bus::Bus;
use crate::config::Config;
use crate::dispatch::commands;
use crate::error::{LinkError, Result};
use crate::packet::{DecodeStatus, Packer, Packet, Unpacker};

/// Request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// No outstanding request
    Idle,

    /// A request was written; polling for the response
    AwaitingResponse,
}

/// Drives one bus, one request at a time
pub struct Client {
    bus: Box<dyn Bus>,
    config: Config,
    state: ClientState,
}

impl Client {
    /// Create a client over an already-connected bus
    pub fn new(bus: Box<dyn Bus>, config: Config) -> Self {
        Self {
            bus,
            config,
            state: ClientState::Idle,
        }
    }

    /// Current request state
    pub fn state(&self) -> ClientState {
        self.state
    }

    /// Send a request and block until its response arrives.
    ///
    /// The receive loop polls the bus with `poll_interval` sleeps and
    /// gives up with [`LinkError::Timeout`] once `response_timeout`
    /// elapses. A reserved ERROR reply from the peer surfaces as
    /// [`LinkError::Protocol`]. In every outcome the client is back in
    /// `Idle`; retrying is the caller's decision.
    pub fn send(&mut self, request: &Packet) -> Result<Packet> {
        self.bus.write_packet(request)?;
        self.state = ClientState::AwaitingResponse;
        let deadline = self.config.response_timeout.map(|t| Instant::now() + t);

        loop {
            match self.bus.process_byte() {
                Ok(DecodeStatus::Done) => {
                    self.state = ClientState::Idle;
                    let response = self.bus.take_packet().ok_or_else(|| {
                        LinkError::Protocol(
                            "decoder completed a frame but none was available".to_string(),
                        )
                    })?;
                    if response.command() == commands::ERROR {
                        return Err(LinkError::Protocol(format!(
                            "peer rejected command 0x{:02X}",
                            response.data().first().copied().unwrap_or(request.command())
                        )));
                    }
                    return Ok(response);
                }
                Ok(DecodeStatus::NotDone) => {
                    if let Some(deadline) = deadline {
                        if Instant::now() >= deadline {
                            self.state = ClientState::Idle;
                            return Err(LinkError::Timeout);
                        }
                    }
                    thread::sleep(self.config.poll_interval);
                }
                Err(e) => {
                    self.state = ClientState::Idle;
                    return Err(e);
                }
            }
        }
    }

    /// Probe the peer with a PING carrying the given payload
    pub fn ping(&mut self, payload: &[u8]) -> Result<Packet> {
        let mut request = Packet::with_capacity(commands::PING, self.config.packet_capacity);
        request.set_data(payload)?;
        self.send(&request)
    }

    /// Ask the peer to turn its byte tracing on or off; returns the
    /// setting now in effect
    pub fn set_peer_debug(&mut self, on: bool) -> Result<bool> {
        let mut request = Packet::with_capacity(commands::DEBUG, self.config.packet_capacity);
        let mut packer = Packer::new(&mut request);
        packer.pack_u32(on as u32)?;
        let response = self.send(&request)?;
        let mut unpacker = Unpacker::new(response.data());
        Ok(unpacker.unpack_u32()? != 0)
    }

    /// Release the bus transport
    pub fn close(&mut self) -> Result<()> {
        self.bus.close()
    }
}
