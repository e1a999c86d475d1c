//! Parlor chat relay server.
//!
//! Relays chat messages, presence and typing events between WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use parlor_server::{
    infrastructure::message_pusher::WebSocketMessagePusher,
    ui::{Server, ServerConfig, config},
    usecase::{Dispatcher, EventBroadcaster},
};
use parlor_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "WebSocket chat relay with presence and typing notifications", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Seconds between WebSocket pings
    #[arg(long, default_value_t = config::DEFAULT_PING_INTERVAL_SECS)]
    ping_interval_secs: u64,

    /// Seconds to wait for traffic after a ping before dropping the client
    #[arg(long, default_value_t = config::DEFAULT_PING_TIMEOUT_SECS)]
    ping_timeout_secs: u64,

    /// Do not send "message delivered" acknowledgements to senders
    #[arg(long)]
    no_delivery_receipts: bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            ping_interval: Duration::from_secs(args.ping_interval_secs),
            ping_timeout: Duration::from_secs(args.ping_timeout_secs),
            delivery_receipts: !args.no_delivery_receipts,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "tower_http"], &args.log_level);

    let config = ServerConfig::from(args);

    // Initialize dependencies in order:
    // 1. MessagePusher
    // 2. EventBroadcaster (owns the SessionRegistry)
    // 3. Dispatcher
    // 4. Server

    // 1. Create MessagePusher (WebSocket implementation)
    let message_pusher = Box::new(WebSocketMessagePusher::new());

    // 2. Create EventBroadcaster
    let broadcaster = EventBroadcaster::new(message_pusher, Arc::new(SystemClock))
        .with_delivery_receipts(config.delivery_receipts);

    // 3. Spawn the Dispatcher task
    let (dispatcher, handle) = Dispatcher::new(broadcaster);
    tokio::spawn(dispatcher.run());

    // 4. Create and run the server
    let server = Server::new(handle, config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
