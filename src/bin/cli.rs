//! devlink CLI Client
//!
//! Connects to a peer over TCP or serial and sends a PING.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use devlink::bus::{Bus, SerialBus, SocketBus, DEFAULT_PORT};
use devlink::config::DEFAULT_BAUD_RATE;
use devlink::{Client, Config};

/// devlink client
#[derive(Parser, Debug)]
#[command(name = "devlink-cli")]
#[command(about = "Send commands to a devlink peer over TCP or serial")]
#[command(version)]
struct Args {
    /// Turn on bus byte tracing
    #[arg(short, long)]
    debug: bool,

    /// Host to connect to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// TCP port to connect to
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Serial device to use instead of TCP (e.g. /dev/ttyUSB0)
    #[arg(short, long)]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Turn on verbose messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "devlink=debug"
    } else {
        "devlink=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).init();

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> devlink::Result<()> {
    let mut builder = Config::builder()
        .host(&args.host)
        .port(args.port)
        .baud_rate(args.baud)
        .debug(args.debug);
    if let Some(device) = &args.serial {
        builder = builder.serial_device(device);
    }
    let config = builder.build();

    let mut bus: Box<dyn Bus> = match &config.serial_device {
        Some(device) => {
            tracing::info!("opening {} at {} baud", device, config.baud_rate);
            match SerialBus::open_with_capacity(device, config.baud_rate, config.packet_capacity) {
                Ok(bus) => Box::new(bus),
                Err(e) => {
                    if let Ok(ports) = SerialBus::list_ports() {
                        tracing::info!("serial ports on this machine: {}", ports.join(", "));
                    }
                    return Err(e);
                }
            }
        }
        None => {
            tracing::info!("connecting to {}:{}", config.host, config.port);
            Box::new(SocketBus::connect_with_capacity(
                &config.host,
                config.port,
                config.packet_capacity,
            )?)
        }
    };
    bus.set_debug(config.debug);

    let mut client = Client::new(bus, config);

    // NUL-terminated so C firmware can print the payload in place.
    let response = client.ping(b"Ping Data\0")?;
    tracing::info!(
        "peer is alive ({} payload bytes echoed)",
        response.data().len()
    );

    client.close()
}
