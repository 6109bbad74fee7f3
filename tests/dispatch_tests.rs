//! Dispatch tests
//!
//! Registry lookup, the core handlers, and the reserved ERROR response.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use devlink::dispatch::{commands, CommandHandler, DebugHandler, Dispatcher, PingHandler};
use devlink::packet::{Packer, Packet, Unpacker};
use devlink::Result;

#[test]
fn test_ping_echoes_payload() {
    let dispatcher = Dispatcher::with_core_handlers();

    let mut request = Packet::new(commands::PING);
    request.set_data(b"Ping Data\0").unwrap();
    let response = dispatcher.dispatch(&request);

    assert_eq!(response.command(), commands::PING);
    assert_eq!(response.data(), b"Ping Data\0");
}

#[test]
fn test_ping_with_empty_payload() {
    let dispatcher = Dispatcher::with_core_handlers();

    let response = dispatcher.dispatch(&Packet::new(commands::PING));

    assert_eq!(response.command(), commands::PING);
    assert!(response.data().is_empty());
}

#[test]
fn test_unregistered_command_gets_error_response() {
    let dispatcher = Dispatcher::with_core_handlers();

    let response = dispatcher.dispatch(&Packet::new(99));

    assert_eq!(response.command(), commands::ERROR);
    assert_eq!(response.data(), &[99]);
}

#[test]
fn test_handler_failure_gets_error_response() {
    let dispatcher = Dispatcher::with_core_handlers();

    // DEBUG expects a u32 payload; an empty one makes the handler fail.
    let response = dispatcher.dispatch(&Packet::new(commands::DEBUG));

    assert_eq!(response.command(), commands::ERROR);
    assert_eq!(response.data(), &[commands::DEBUG]);
}

#[test]
fn test_debug_handler_toggles_shared_flag() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(
        commands::DEBUG,
        Box::new(DebugHandler::new(Arc::clone(&flag))),
    );

    let mut request = Packet::new(commands::DEBUG);
    let mut packer = Packer::new(&mut request);
    packer.pack_u32(1).unwrap();
    let response = dispatcher.dispatch(&request);

    assert!(flag.load(Ordering::Relaxed));
    assert_eq!(response.command(), commands::DEBUG);
    let mut unpacker = Unpacker::new(response.data());
    assert_eq!(unpacker.unpack_u32().unwrap(), 1);
}

#[test]
fn test_register_replaces_handler() {
    struct NakHandler;

    impl CommandHandler for NakHandler {
        fn handle(&self, request: &Packet) -> Result<Packet> {
            let mut response = Packet::new(request.command());
            response.set_data(b"nak")?;
            Ok(response)
        }
    }

    let mut dispatcher = Dispatcher::with_core_handlers();
    assert!(dispatcher.is_registered(commands::PING));

    dispatcher.register(commands::PING, Box::new(NakHandler));
    let response = dispatcher.dispatch(&Packet::new(commands::PING));

    assert_eq!(response.data(), b"nak");
}

#[test]
fn test_ping_handler_direct() {
    let mut request = Packet::new(commands::PING);
    request.set_data(&[0x00, 0xFF, 0x02]).unwrap();

    let response = PingHandler.handle(&request).unwrap();

    assert_eq!(response.data(), &[0x00, 0xFF, 0x02]);
}
