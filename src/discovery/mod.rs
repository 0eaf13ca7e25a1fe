//! Device discovery module
//!
//! Finds NCD controllers on the local network by looking through the
//! operating system's neighbor (ARP) table for hardware addresses carrying
//! the NCD vendor prefix.
//!
//! Discovery is best effort: a missing tool, an unreadable table or no match
//! all produce an empty address and a logged diagnostic, never an error for
//! the device handle.

mod arp;
mod parse;

pub use arp::*;
pub use parse::*;

use parse::parse_octets;

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Vendor prefix (OUI) of NCD ethernet controllers
pub const NCD_OUI: Oui = Oui([0x00, 0x08, 0xdc]);

/// Discovery errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to run {program}: {message}")]
    Command { program: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hardware address: {0}")]
    InvalidHardwareAddress(String),

    #[error("No device with vendor prefix {0} in the neighbor table")]
    NoMatch(Oui),
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Organizationally unique identifier: the first three bytes of a MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Oui(pub [u8; 3]);

impl FromStr for Oui {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets = parse_octets::<3>(s)
            .ok_or_else(|| DiscoveryError::InvalidHardwareAddress(s.to_string()))?;
        Ok(Oui(octets))
    }
}

impl fmt::Display for Oui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}-{:02x}-{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// Link-layer hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn oui(&self) -> Oui {
        Oui([self.0[0], self.0[1], self.0[2]])
    }
}

impl FromStr for MacAddress {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets = parse_octets::<6>(s)
            .ok_or_else(|| DiscoveryError::InvalidHardwareAddress(s.to_string()))?;
        Ok(MacAddress(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|b| format!("{:02x}", b)).collect();
        f.write_str(&parts.join("-"))
    }
}

/// One row of the neighbor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

/// A source of neighbor table text, one per platform mechanism
pub trait NeighborTable: Send + Sync {
    /// Short name for diagnostics
    fn name(&self) -> &'static str;

    /// Read the raw table
    fn read(&self) -> DiscoveryResult<String>;
}

/// Looks up NCD controllers through one or more neighbor tables
pub struct AddressResolver {
    tables: Vec<Box<dyn NeighborTable>>,
    oui: Oui,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self::new(NCD_OUI)
    }
}

impl AddressResolver {
    /// Resolver using the current platform's tables
    pub fn new(oui: Oui) -> Self {
        Self::with_tables(platform_tables(), oui)
    }

    /// Resolver over explicit tables, consulted in order
    pub fn with_tables(tables: Vec<Box<dyn NeighborTable>>, oui: Oui) -> Self {
        Self { tables, oui }
    }

    pub fn oui(&self) -> Oui {
        self.oui
    }

    /// Every entry matching the vendor prefix, from the first readable table
    pub fn find_devices(&self) -> DiscoveryResult<Vec<NeighborEntry>> {
        let mut last_error = None;

        for table in &self.tables {
            match table.read() {
                Ok(text) => {
                    let matches = matching_entries(&text, self.oui);
                    tracing::debug!(
                        "{} lists {} device(s) with prefix {}",
                        table.name(),
                        matches.len(),
                        self.oui
                    );
                    return Ok(matches);
                }
                Err(e) => {
                    tracing::debug!("Neighbor table {} unavailable: {}", table.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(DiscoveryError::NoMatch(self.oui)))
    }

    /// First matching device address
    pub fn find_first(&self) -> DiscoveryResult<Ipv4Addr> {
        self.find_devices()?
            .first()
            .map(|entry| entry.ip)
            .ok_or(DiscoveryError::NoMatch(self.oui))
    }

    /// Address of the first matching device, or an empty string.
    ///
    /// Only the first match is used when several controllers are present.
    pub fn resolve(&self) -> String {
        match self.find_first() {
            Ok(ip) => {
                tracing::info!("Found NCD device on network with IP: {}", ip);
                ip.to_string()
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to find an NCD device on network ({}). \
                     Run the NCD configuration tool to troubleshoot connection issues",
                    e
                );
                String::new()
            }
        }
    }
}
