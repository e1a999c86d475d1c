//! Server configuration.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 25;
pub const DEFAULT_PING_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to bind to
    pub port: u16,
    /// Interval between WebSocket pings sent to each client
    pub ping_interval: Duration,
    /// How long to wait for any frame after a ping before dropping the client
    pub ping_timeout: Duration,
    /// Send `message delivered` to the sender of each chat message
    pub delivery_receipts: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
            ping_timeout: Duration::from_secs(DEFAULT_PING_TIMEOUT_SECS),
            delivery_receipts: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// A connection that sends nothing for this long is considered dead.
    pub fn idle_timeout(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}
