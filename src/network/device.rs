//! NCD device handle
//!
//! The public entry point: finds the controller, connects to it and switches
//! relays. A handle connects once; there is no disconnect or reconnect.

use std::io;
use thiserror::Error;

use super::connection::{Connection, ConnectionStats};
use super::transport::TransportError;
use super::TransportOptions;
use crate::discovery::AddressResolver;
use crate::protocol::{encode, AddressError, Bank, Relay, RelayCommand, Reply};

/// Device errors
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("Failed to connect to {address}:{port}: {source}")]
    ConnectionFailed {
        address: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Not connected")]
    NotConnected,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Handle to one NCD relay controller
#[derive(Debug)]
pub struct Device {
    /// Controller IP address or host name; empty when discovery failed
    address: String,
    /// Controller TCP port
    port: u16,
    /// Socket options used by `connect`
    options: TransportOptions,
    /// Open connection, once `connect` succeeded
    connection: Option<Connection>,
}

impl Device {
    /// Create a handle for the controller listening on `port`.
    ///
    /// When `address` is `None` the local neighbor table is searched for an
    /// NCD controller. Construction never fails; if nothing is found the
    /// address is left empty and `connect` will fail.
    pub fn new(port: u16, address: Option<&str>) -> Self {
        Self::with_options(port, address, TransportOptions::default())
    }

    /// Create a handle with explicit transport options
    pub fn with_options(port: u16, address: Option<&str>, options: TransportOptions) -> Self {
        match address {
            Some(address) => Self::from_parts(address.to_string(), port, options),
            None => Self::with_resolver(port, &AddressResolver::default(), options),
        }
    }

    /// Create a handle whose address is found by `resolver`
    pub fn with_resolver(port: u16, resolver: &AddressResolver, options: TransportOptions) -> Self {
        Self::from_parts(resolver.resolve(), port, options)
    }

    fn from_parts(address: String, port: u16, options: TransportOptions) -> Self {
        Self {
            address,
            port,
            options,
            connection: None,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Statistics of the open connection
    pub fn stats(&self) -> Option<&ConnectionStats> {
        self.connection.as_ref().map(Connection::stats)
    }

    /// Connect to the controller at the handle's address and port
    pub fn connect(&mut self) -> DeviceResult<()> {
        if self.connection.is_some() {
            return Err(DeviceError::AlreadyConnected);
        }

        if self.address.is_empty() {
            return Err(self.connection_failed(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "device address is unresolved",
            )));
        }

        tracing::info!("Connecting to NCD device at {}:{}", self.address, self.port);

        let conn = Connection::open(&self.address, self.port, &self.options)
            .map_err(|e| self.connection_failed(e))?;

        tracing::info!("Connected to NCD device at {}", conn.remote_addr());
        self.connection = Some(conn);
        Ok(())
    }

    fn connection_failed(&self, source: io::Error) -> DeviceError {
        DeviceError::ConnectionFailed {
            address: self.address.clone(),
            port: self.port,
            source,
        }
    }

    /// Switch `relay` (1-8) of `bank` (0-32, 0 = all banks) on or off.
    ///
    /// Arguments are validated before anything is written. The device reply
    /// is only read when the handle was built with `read_reply` set.
    pub fn switch_relay(&mut self, bank: i64, relay: i64, on: bool) -> DeviceResult<()> {
        let command = validate(bank, relay, on)?;
        self.send_command(&command)?;

        if self.options.read_reply {
            let reply = self.read_reply()?;
            tracing::debug!("Reply to {}: {}", command, reply);
        }
        Ok(())
    }

    /// Switch a relay and wait for the controller's reply
    pub fn switch_relay_acked(&mut self, bank: i64, relay: i64, on: bool) -> DeviceResult<Reply> {
        let command = validate(bank, relay, on)?;
        self.send_command(&command)?;
        self.read_reply()
    }

    /// Send an already validated relay command without reading the reply
    pub fn send_command(&mut self, command: &RelayCommand) -> DeviceResult<()> {
        let conn = self.connection.as_mut().ok_or(DeviceError::NotConnected)?;

        tracing::info!("Switching {}", command);
        conn.send_frame(&encode(command))?;
        Ok(())
    }

    /// Read one raw reply frame from the controller
    pub fn read_reply(&mut self) -> DeviceResult<Reply> {
        let conn = self.connection.as_mut().ok_or(DeviceError::NotConnected)?;
        Ok(conn.recv_reply()?)
    }
}

fn validate(bank: i64, relay: i64, on: bool) -> Result<RelayCommand, AddressError> {
    let bank = Bank::new(bank)?;
    let relay = Relay::new(relay)?;
    Ok(RelayCommand::new(bank, relay, on))
}
