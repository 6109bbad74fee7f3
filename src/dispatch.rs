//! Command dispatch
//!
//! Maps command codes to handlers on the responding side of the link.
//! The registry is built once at startup and never mutated afterwards,
//! so connection threads share it behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::packet::{Packer, Packet, Unpacker};

/// Reserved command codes
pub mod commands {
    /// Liveness probe; the handler echoes the payload uninterpreted
    pub const PING: u8 = 0x01;

    /// Toggle the peer's byte tracing; payload and reply are one u32
    pub const DEBUG: u8 = 0x02;

    /// Unsolicited log output from the peer (reserved, no handler here)
    pub const LOG: u8 = 0x03;

    /// Reserved response to an unregistered command; payload carries the
    /// offending code
    pub const ERROR: u8 = 0xFF;
}

/// Maps a decoded request payload to a response packet
pub trait CommandHandler: Send + Sync {
    fn handle(&self, request: &Packet) -> Result<Packet>;
}

/// Registry from command code to handler
pub struct Dispatcher {
    handlers: HashMap<u8, Box<dyn CommandHandler>>,
}

impl Dispatcher {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Create a registry with the core handlers (PING, DEBUG) installed
    pub fn with_core_handlers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(commands::PING, Box::new(PingHandler));
        dispatcher.register(commands::DEBUG, Box::new(DebugHandler::default()));
        dispatcher
    }

    /// Register a handler for a command code, replacing any existing one
    pub fn register(&mut self, code: u8, handler: Box<dyn CommandHandler>) {
        self.handlers.insert(code, handler);
    }

    /// True if a handler is registered for the code
    pub fn is_registered(&self, code: u8) -> bool {
        self.handlers.contains_key(&code)
    }

    /// Look up and run the handler for a request.
    ///
    /// An unregistered code, or a handler failure, produces the reserved
    /// ERROR response rather than silence.
    pub fn dispatch(&self, request: &Packet) -> Packet {
        let code = request.command();
        match self.handlers.get(&code) {
            Some(handler) => match handler.handle(request) {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("handler for command 0x{:02X} failed: {}", code, e);
                    error_response(code)
                }
            },
            None => {
                tracing::debug!("no handler registered for command 0x{:02X}", code);
                error_response(code)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the reserved ERROR response for a rejected command code
pub fn error_response(code: u8) -> Packet {
    let mut packet = Packet::new(commands::ERROR);
    // A one-byte payload always fits.
    let _ = packet.set_data(&[code]);
    packet
}

// =============================================================================
// Core Handlers
// =============================================================================

/// Echoes the request payload back, confirming the link is alive
pub struct PingHandler;

impl CommandHandler for PingHandler {
    fn handle(&self, request: &Packet) -> Result<Packet> {
        let mut response = Packet::with_capacity(commands::PING, request.capacity());
        response.set_data(request.data())?;
        Ok(response)
    }
}

/// Switches the peer's byte tracing on or off.
///
/// The request carries the new setting as a u32; the reply carries the
/// setting now in effect. The flag is shared so the serving loop can
/// observe it.
pub struct DebugHandler {
    enabled: Arc<AtomicBool>,
}

impl DebugHandler {
    pub fn new(enabled: Arc<AtomicBool>) -> Self {
        Self { enabled }
    }
}

impl Default for DebugHandler {
    fn default() -> Self {
        Self::new(Arc::new(AtomicBool::new(false)))
    }
}

impl CommandHandler for DebugHandler {
    fn handle(&self, request: &Packet) -> Result<Packet> {
        let mut unpacker = Unpacker::new(request.data());
        let on = unpacker.unpack_u32()? != 0;
        self.enabled.store(on, Ordering::Relaxed);
        tracing::info!("bus debug turned {}", if on { "on" } else { "off" });

        let mut response = Packet::with_capacity(commands::DEBUG, request.capacity());
        let mut packer = Packer::new(&mut response);
        packer.pack_u32(on as u32)?;
        Ok(response)
    }
}
