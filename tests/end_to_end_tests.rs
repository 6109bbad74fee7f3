//! End-to-end tests
//!
//! Full client/server exchanges over loopback TCP: the client's poll
//! loop, the server's dispatch loop, and the shared packet logic all in
//! one path.

use std::io::Write;
use std::net::{SocketAddr, TcpListener};
use std::thread;
use std::time::Duration;

use devlink::bus::{Bus, SocketBus};
use devlink::dispatch::{commands, Dispatcher};
use devlink::packet::{DecodeStatus, Decoder, Packet};
use devlink::{Client, ClientState, Config, LinkError, Server};

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config() -> Config {
    Config::builder()
        .poll_interval(Duration::from_micros(100))
        .response_timeout(Some(Duration::from_secs(2)))
        .build()
}

/// Bind a loopback listener and serve `connections` clients with the
/// core registry on a background thread
fn start_server(connections: usize) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let server = Server::new(Dispatcher::with_core_handlers(), Config::default());
        for _ in 0..connections {
            let stream = match listener.accept() {
                Ok((stream, _)) => stream,
                Err(_) => return,
            };
            let mut bus = SocketBus::from_stream(stream).unwrap();
            let _ = server.serve_bus(&mut bus);
        }
    });
    addr
}

fn connect(addr: SocketAddr) -> Client {
    let bus = SocketBus::connect(&addr.ip().to_string(), addr.port()).unwrap();
    Client::new(Box::new(bus), test_config())
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_ping_end_to_end() {
    let addr = start_server(1);
    let mut client = connect(addr);

    let response = client.ping(b"Ping Data\0").unwrap();

    assert_eq!(response.command(), commands::PING);
    assert_eq!(response.data(), b"Ping Data\0");
    assert_eq!(client.state(), ClientState::Idle);
    client.close().unwrap();
}

#[test]
fn test_sequential_requests_on_one_connection() {
    let addr = start_server(1);
    let mut client = connect(addr);

    let first = client.ping(b"first").unwrap();
    assert_eq!(first.data(), b"first");

    let enabled = client.set_peer_debug(true).unwrap();
    assert!(enabled);

    let second = client.ping(b"second").unwrap();
    assert_eq!(second.data(), b"second");

    client.close().unwrap();
}

#[test]
fn test_unregistered_command_is_protocol_error() {
    let addr = start_server(1);
    let mut client = connect(addr);

    let result = client.send(&Packet::new(99));

    match result {
        Err(LinkError::Protocol(message)) => assert!(message.contains("0x63")),
        other => panic!(
            "expected protocol error, got {:?}",
            other.map(|p| p.command())
        ),
    }
    client.close().unwrap();
}

#[test]
fn test_mute_peer_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept and then say nothing.
    thread::spawn(move || {
        let stream = listener.accept().map(|(s, _)| s);
        thread::sleep(Duration::from_millis(500));
        drop(stream);
    });

    let bus = SocketBus::connect(&addr.ip().to_string(), addr.port()).unwrap();
    let config = Config::builder()
        .poll_interval(Duration::from_micros(100))
        .response_timeout(Some(Duration::from_millis(100)))
        .build();
    let mut client = Client::new(Box::new(bus), config);

    let result = client.send(&Packet::new(commands::PING));

    assert!(matches!(result, Err(LinkError::Timeout)));
    assert_eq!(client.state(), ClientState::Idle);
}

#[test]
fn test_server_survives_corrupt_frame() {
    let addr = start_server(1);

    // Raw socket: junk bytes, then a valid ping.
    let mut stream = std::net::TcpStream::connect(addr).unwrap();
    stream.write_all(&[0x55, 0xAA, 0x55]).unwrap();

    let mut request = Packet::new(commands::PING);
    request.set_data(b"still alive").unwrap();
    stream.write_all(&request.encode()).unwrap();

    // The server drops the junk (one framing error per byte, decoder
    // re-armed each time) and still answers the ping.
    let mut bus = SocketBus::from_stream(stream).unwrap();
    let response = pump_one(&mut bus);
    assert_eq!(response.command(), commands::PING);
    assert_eq!(response.data(), b"still alive");
}

#[test]
fn test_transport_transparency() {
    let mut expected = Packet::new(commands::PING);
    expected.set_data(b"Ping Data\0").unwrap();
    let frame = expected.encode();

    // Identical byte stream, once through a socket and once straight
    // through a decoder.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let writer_frame = frame.clone();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = stream.write_all(&writer_frame);
        }
    });

    let mut bus = SocketBus::connect(&addr.ip().to_string(), addr.port()).unwrap();
    let from_socket = pump_one(&mut bus);

    let mut decoder = Decoder::new();
    let mut from_decoder = None;
    for &byte in frame.as_ref() {
        if decoder.process_byte(byte).unwrap() == DecodeStatus::Done {
            from_decoder = decoder.take_packet();
        }
    }
    let from_decoder = from_decoder.unwrap();

    assert_eq!(from_socket.command(), from_decoder.command());
    assert_eq!(from_socket.data(), from_decoder.data());
}

/// Poll a bus until one packet completes
fn pump_one(bus: &mut SocketBus) -> Packet {
    loop {
        match bus.process_byte().unwrap() {
            DecodeStatus::Done => return bus.take_packet().unwrap(),
            DecodeStatus::NotDone => thread::sleep(Duration::from_micros(100)),
        }
    }
}
