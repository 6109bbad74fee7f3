//! # devlink
//!
//! A transport-agnostic command/response link for talking to embedded
//! peers, with:
//! - Fixed-capacity packets framed STX/Len/Cmd/payload/Sum/ETX
//! - An incremental byte-at-a-time decoder that re-arms after every frame
//! - Interchangeable TCP and serial transports behind one `Bus` trait
//! - A command registry shared by both ends of the link
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────┐                                 ┌─────────────┐
//! │   Client    │                                 │ Dispatcher  │
//! │ (poll loop) │                                 │ (registry)  │
//! └──────┬──────┘                                 └──────▲──────┘
//!        │ Packet                                        │ Packet
//! ┌──────▼──────┐                                 ┌──────┴──────┐
//! │     Bus     │    bytes over TCP or serial     │     Bus     │
//! │  (encode/   ├────────────────────────────────►│  (decode/   │
//! │   decode)   │◄────────────────────────────────┤   encode)   │
//! └─────────────┘                                 └─────────────┘
//! ```
//!
//! The same packet and dispatch code runs unmodified on both ends; only
//! the transport construction differs.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod packet;
pub mod bus;
pub mod dispatch;
pub mod client;
pub mod server;
pub mod util;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{LinkError, Result};
pub use config::Config;
pub use packet::{DecodeStatus, Decoder, Packer, Packet, Unpacker};
pub use bus::{Bus, SerialBus, SocketBus};
pub use dispatch::{CommandHandler, Dispatcher};
pub use client::{Client, ClientState};
pub use server::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of devlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
