//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8080;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub listen_addr: SocketAddr,
    /// Fault injector countdown: the N-th successful append is corrupted.
    /// Zero or negative disables injection.
    pub corrupt_after: i64,
    /// Deadline for reading the request and for writing the response.
    /// `None` waits indefinitely.
    pub io_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Listen on all interfaces at `port` with defaults otherwise.
    pub fn with_port(port: u16) -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            corrupt_after: -1,
            io_timeout: None,
        }
    }
}
