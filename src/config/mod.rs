//! Configuration module
//!
//! Handles loading and saving ncd-relay configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::discovery::{AddressResolver, Oui, NCD_OUI};
use crate::network::{Device, TransportOptions};
use crate::protocol::DEFAULT_PORT;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid vendor prefix: {0}")]
    InvalidOui(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Device settings
    #[serde(default)]
    pub device: DeviceConfig,

    /// Transport settings
    #[serde(default)]
    pub transport: TransportConfig,

    /// Discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Device configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Controller address (discovered from the neighbor table if not set)
    pub address: Option<String>,
    /// Controller TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
        }
    }
}

/// Transport configuration. Unset or zero timeouts block indefinitely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// Connection timeout in ms
    pub connect_timeout_ms: Option<u64>,
    /// Read timeout in ms
    pub read_timeout_ms: Option<u64>,
    /// Write timeout in ms
    pub write_timeout_ms: Option<u64>,
    /// Read the controller's reply after every command
    #[serde(default)]
    pub read_reply: bool,
}

fn millis(value: Option<u64>) -> Option<Duration> {
    value.filter(|ms| *ms > 0).map(Duration::from_millis)
}

impl TransportConfig {
    pub fn options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: millis(self.connect_timeout_ms),
            read_timeout: millis(self.read_timeout_ms),
            write_timeout: millis(self.write_timeout_ms),
            read_reply: self.read_reply,
        }
    }
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// Hardware address prefix identifying controllers
    #[serde(default = "default_oui")]
    pub oui: String,
}

fn default_oui() -> String {
    NCD_OUI.to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { oui: default_oui() }
    }
}

impl DiscoveryConfig {
    pub fn oui(&self) -> ConfigResult<Oui> {
        self.oui
            .parse()
            .map_err(|_| ConfigError::InvalidOui(self.oui.clone()))
    }

    /// Resolver over the platform neighbor tables for the configured prefix
    pub fn resolver(&self) -> ConfigResult<AddressResolver> {
        Ok(AddressResolver::new(self.oui()?))
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("ncd-relay/config.toml")),
            Some(PathBuf::from("./ncd-relay.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Build a device handle, discovering the address if none is configured
    pub fn device(&self) -> ConfigResult<Device> {
        let port = self.device.port;
        let options = self.transport.options();

        let device = match &self.device.address {
            Some(address) => Device::with_options(port, Some(address), options),
            None => Device::with_resolver(port, &self.discovery.resolver()?, options),
        };
        Ok(device)
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        device: DeviceConfig {
            address: Some("192.168.1.40".to_string()),
            port: DEFAULT_PORT,
        },
        transport: TransportConfig {
            connect_timeout_ms: Some(5000),
            read_timeout_ms: Some(2000),
            write_timeout_ms: Some(2000),
            read_reply: false,
        },
        ..Default::default()
    };

    Ok(toml::to_string_pretty(&config)?)
}
