//! Connection handling for NCD controllers
//!
//! Owns the TCP stream to one controller and moves whole frames over it:
//! - Connection establishment with optional timeouts
//! - Fixed-length frame send and reply receive
//! - Per-connection statistics

use std::io;
use std::net::{SocketAddr, TcpStream};

use super::transport::{receive_exact, send_exact, TransportResult};
use super::{resolve_host, TransportOptions};
use crate::protocol::{to_hex, Reply, RX_MSG_LEN};

/// Connection statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Frames sent
    pub frames_sent: u64,
    /// Replies received
    pub replies_received: u64,
    /// Bytes sent
    pub bytes_sent: u64,
    /// Bytes received
    pub bytes_received: u64,
}

/// An open connection to an NCD controller
#[derive(Debug)]
pub struct Connection {
    /// Remote controller address
    remote_addr: SocketAddr,
    /// The TCP stream
    stream: TcpStream,
    /// Statistics
    stats: ConnectionStats,
}

impl Connection {
    /// Open a TCP connection to `host:port`.
    ///
    /// A single connect attempt is made. Without a connect timeout this blocks
    /// for as long as the operating system keeps trying.
    pub fn open(host: &str, port: u16, options: &TransportOptions) -> io::Result<Self> {
        let addr = resolve_host(host, port)?;

        tracing::debug!("Opening TCP connection to {}", addr);

        let stream = match options.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };

        stream.set_read_timeout(options.read_timeout)?;
        stream.set_write_timeout(options.write_timeout)?;
        stream.set_nodelay(true)?;

        Self::new(stream)
    }

    /// Wrap an established TCP stream
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        let remote_addr = stream.peer_addr()?;
        Ok(Self {
            remote_addr,
            stream,
            stats: ConnectionStats::default(),
        })
    }

    /// Get the remote address
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Get connection statistics
    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    /// Send one complete frame
    pub fn send_frame(&mut self, frame: &[u8]) -> TransportResult<()> {
        tracing::debug!("-> {} [{}]", self.remote_addr, to_hex(frame));

        send_exact(&mut self.stream, frame)?;

        self.stats.frames_sent += 1;
        self.stats.bytes_sent += frame.len() as u64;
        Ok(())
    }

    /// Receive one complete reply frame
    pub fn recv_reply(&mut self) -> TransportResult<Reply> {
        let data = receive_exact(&mut self.stream, RX_MSG_LEN)?;

        let mut reply = [0u8; RX_MSG_LEN];
        reply.copy_from_slice(&data);

        self.stats.replies_received += 1;
        self.stats.bytes_received += data.len() as u64;

        tracing::debug!("<- {} [{}]", self.remote_addr, to_hex(&reply));
        Ok(Reply(reply))
    }
}
