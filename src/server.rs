//! Peer-side serving loop
//!
//! Accepts connections and answers commands through the dispatch
//! registry. The serving loop itself is transport-agnostic; the TCP
//! accept loop and the serial entry point both feed it.

use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use crate::bus::{Bus, SerialBus, SocketBus};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{LinkError, Result};
use crate::packet::DecodeStatus;

/// Serves a command registry over one or more buses
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    config: Config,
}

impl Server {
    /// Create a server with the given registry and config
    pub fn new(dispatcher: Dispatcher, config: Config) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    /// Accept TCP connections and serve each on its own thread (blocking)
    pub fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)?;
        tracing::info!("listening on {}", self.config.listen_addr);

        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("accept failed: {}", e);
                    continue;
                }
            };

            let dispatcher = Arc::clone(&self.dispatcher);
            let capacity = self.config.packet_capacity;
            let debug = self.config.debug;
            thread::spawn(move || {
                let mut bus = match SocketBus::from_stream_with_capacity(stream, capacity) {
                    Ok(bus) => bus,
                    Err(e) => {
                        tracing::warn!("connection setup failed: {}", e);
                        return;
                    }
                };
                bus.set_debug(debug);
                let peer = bus.peer_addr().to_string();
                tracing::debug!("connection established from {}", peer);
                if let Err(e) = serve(&dispatcher, &mut bus) {
                    tracing::warn!("session with {} ended: {}", peer, e);
                }
                let _ = bus.close();
            });
        }

        Ok(())
    }

    /// Open the configured serial device and serve it (blocking)
    pub fn run_serial(&self) -> Result<()> {
        let device = self.config.serial_device.as_deref().ok_or_else(|| {
            LinkError::Config("no serial device configured".to_string())
        })?;
        let mut bus =
            SerialBus::open_with_capacity(device, self.config.baud_rate, self.config.packet_capacity)?;
        bus.set_debug(self.config.debug);
        tracing::info!("serving {} at {} baud", bus.device(), self.config.baud_rate);
        serve(&self.dispatcher, &mut bus)
    }

    /// Serve a single already-open bus until its peer goes away (blocking)
    pub fn serve_bus(&self, bus: &mut dyn Bus) -> Result<()> {
        serve(&self.dispatcher, bus)
    }
}

/// Pump one bus: assemble requests, dispatch them, write replies.
///
/// Corrupt frames are dropped and the loop keeps going (the decoder has
/// already re-armed). A closed peer ends the session normally; other
/// transport failures propagate.
fn serve(dispatcher: &Dispatcher, bus: &mut dyn Bus) -> Result<()> {
    loop {
        match bus.process_byte() {
            Ok(DecodeStatus::Done) => {
                let request = match bus.take_packet() {
                    Some(packet) => packet,
                    None => continue,
                };
                tracing::trace!(
                    command = request.command(),
                    len = request.data().len(),
                    "request"
                );
                let response = dispatcher.dispatch(&request);
                bus.write_packet(&response)?;
            }
            Ok(DecodeStatus::NotDone) => {
                // The bus already waited its bounded poll window.
            }
            Err(LinkError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("peer disconnected");
                return Ok(());
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("dropping corrupt frame: {}", e);
            }
            Err(e) => return Err(e),
        }
    }
}

fn is_disconnect(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
