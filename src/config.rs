//! Configuration for devlink
//!
//! Centralized configuration with sensible defaults. Debug and verbosity
//! settings live here rather than in process-wide flags, so two buses can
//! run with independent settings in the same process.

use std::time::Duration;

use crate::bus::DEFAULT_PORT;

/// Default baud rate for serial connections
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Main configuration for a devlink endpoint (client or server)
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// Host to connect to (client side)
    pub host: String,

    /// TCP port to connect to or listen on
    pub port: u16,

    /// Serial device path; when set, the serial transport is used
    /// instead of TCP
    pub serial_device: Option<String>,

    /// Serial baud rate (8-N-1, no flow control)
    pub baud_rate: u32,

    /// TCP listen address (server side)
    pub listen_addr: String,

    // -------------------------------------------------------------------------
    // Packet Configuration
    // -------------------------------------------------------------------------
    /// Fixed packet buffer capacity in bytes, framing overhead included
    pub packet_capacity: usize,

    // -------------------------------------------------------------------------
    // Polling Configuration
    // -------------------------------------------------------------------------
    /// Sleep between receive-poll attempts while awaiting a response
    pub poll_interval: Duration,

    /// Deadline for a response to an outstanding request.
    /// `None` disables the deadline and restores the reference
    /// behavior of waiting forever.
    pub response_timeout: Option<Duration>,

    // -------------------------------------------------------------------------
    // Tracing Configuration
    // -------------------------------------------------------------------------
    /// Enable byte-level TX/RX tracing on buses built from this config
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            serial_device: None,
            baud_rate: DEFAULT_BAUD_RATE,
            listen_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            packet_capacity: crate::packet::DEFAULT_CAPACITY,
            poll_interval: Duration::from_millis(1),
            response_timeout: Some(Duration::from_millis(1000)),
            debug: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the host to connect to
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Select the serial transport with the given device path
    pub fn serial_device(mut self, device: impl Into<String>) -> Self {
        self.config.serial_device = Some(device.into());
        self
    }

    /// Set the serial baud rate
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.config.baud_rate = baud;
        self
    }

    /// Set the TCP listen address (server side)
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the fixed packet buffer capacity (framing overhead included)
    pub fn packet_capacity(mut self, capacity: usize) -> Self {
        self.config.packet_capacity = capacity;
        self
    }

    /// Set the sleep between receive-poll attempts
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the response deadline; `None` waits forever
    pub fn response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.response_timeout = timeout;
        self
    }

    /// Enable or disable byte-level TX/RX tracing
    pub fn debug(mut self, on: bool) -> Self {
        self.config.debug = on;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
