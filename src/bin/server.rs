//! devlink Server Binary
//!
//! Answers devlink commands over TCP or a serial device. Stands in for
//! device firmware during development and testing.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use devlink::bus::DEFAULT_PORT;
use devlink::config::DEFAULT_BAUD_RATE;
use devlink::dispatch::Dispatcher;
use devlink::{Config, Server};

/// devlink server
#[derive(Parser, Debug)]
#[command(name = "devlink-server")]
#[command(about = "Answer devlink commands over TCP or serial")]
#[command(version)]
struct Args {
    /// TCP listen address (host:port)
    #[arg(short, long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    listen: String,

    /// Serial device to serve instead of TCP (e.g. /dev/ttyUSB0)
    #[arg(short, long)]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Turn on bus byte tracing
    #[arg(short, long)]
    debug: bool,

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

    tracing::info!("devlink server v{}", devlink::VERSION);

    let mut builder = Config::builder()
        .listen_addr(&args.listen)
        .baud_rate(args.baud)
        .debug(args.debug);
    if let Some(device) = &args.serial {
        builder = builder.serial_device(device);
    }
    let config = builder.build();
    let serve_serial = config.serial_device.is_some();

    let server = Server::new(Dispatcher::with_core_handlers(), config);
    let result = if serve_serial {
        server.run_serial()
    } else {
        server.run()
    };

    if let Err(e) = result {
        tracing::error!("server error: {}", e);
        std::process::exit(1);
    }
}
