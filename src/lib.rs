//! ncd-relay - Client driver for NCD network relay controllers
//!
//! Finds an NCD ethernet relay controller on the local network, connects to
//! it over TCP and switches individual relays with fixed 6-byte commands.
//!
//! ```no_run
//! use ncd_relay::{Device, DEFAULT_PORT};
//!
//! let mut device = Device::new(DEFAULT_PORT, Some("192.168.1.40"));
//! device.connect()?;
//! device.switch_relay(0, 1, true)?;
//! # Ok::<(), ncd_relay::DeviceError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod network;
pub mod protocol;

pub use config::Config;
pub use discovery::AddressResolver;
pub use network::{Device, DeviceError, DeviceResult, TransportOptions};
pub use protocol::{Bank, Relay, RelayCommand, Reply, DEFAULT_PORT};
