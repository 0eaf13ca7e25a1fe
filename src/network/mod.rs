//! Network module - Handles TCP communication with NCD controllers
//!
//! Provides:
//! - Exact-length send/receive primitives over any byte stream
//! - A connection owning the TCP socket and its statistics
//! - The device handle that validates and sends relay commands

mod connection;
mod device;
mod transport;

pub use connection::*;
pub use device::*;
pub use transport::*;

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

/// Socket options applied when a connection is opened.
///
/// Every timeout defaults to `None`, which blocks until the peer answers or
/// the connection fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOptions {
    /// Connect timeout
    pub connect_timeout: Option<Duration>,
    /// Per-read timeout
    pub read_timeout: Option<Duration>,
    /// Per-write timeout
    pub write_timeout: Option<Duration>,
    /// Read the 4-byte reply after each relay command
    pub read_reply: bool,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }

    pub fn with_read_reply(mut self, read_reply: bool) -> Self {
        self.read_reply = read_reply;
        self
    }
}

/// Resolve a host name or IP literal to a socket address
pub fn resolve_host(host: &str, port: u16) -> std::io::Result<SocketAddr> {
    let mut addrs = (host, port).to_socket_addrs()?;

    addrs.next().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Could not resolve host: {}", host),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ip_literal() {
        let addr = resolve_host("127.0.0.1", 2101).unwrap();
        assert_eq!(addr, "127.0.0.1:2101".parse().unwrap());
    }

    #[test]
    fn test_options_builders() {
        let options = TransportOptions::new()
            .with_connect_timeout(Duration::from_secs(2))
            .with_io_timeout(Duration::from_millis(500))
            .with_read_reply(true);
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(options.read_timeout, Some(Duration::from_millis(500)));
        assert_eq!(options.write_timeout, Some(Duration::from_millis(500)));
        assert!(options.read_reply);
        assert_eq!(TransportOptions::default().read_timeout, None);
    }
}
