//! ncd-relay - Command line control of NCD relay controllers

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ncd_relay::config::{self, Config};
use ncd_relay::protocol::{self, Bank, Relay};

/// ncd-relay - Switch relays on NCD network relay controllers
#[derive(Parser)]
#[command(name = "ncd-relay")]
#[command(author = "ncd-relay Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Switch relays on NCD network relay controllers", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Controller IP address (discovered from the ARP table if omitted)
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Controller TCP port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Switch one relay on or off
    Switch {
        /// Bank number (0 = all banks)
        #[arg(allow_negative_numbers = true)]
        bank: i64,

        /// Relay number within the bank (1-8)
        #[arg(allow_negative_numbers = true)]
        relay: i64,

        /// Target state
        #[arg(value_enum)]
        state: RelayState,

        /// Wait for and print the controller's reply
        #[arg(short, long)]
        wait_reply: bool,
    },

    /// Find NCD controllers in the local ARP table
    Discover,

    /// Print the command frame for a relay switch without sending it
    Frame {
        /// Bank number (0 = all banks)
        #[arg(allow_negative_numbers = true)]
        bank: i64,

        /// Relay number within the bank (1-8)
        #[arg(allow_negative_numbers = true)]
        relay: i64,

        /// Target state
        #[arg(value_enum)]
        state: RelayState,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RelayState {
    On,
    Off,
}

impl RelayState {
    fn is_on(self) -> bool {
        self == RelayState::On
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    if let Some(address) = cli.address {
        config.device.address = Some(address);
    }
    if let Some(port) = cli.port {
        config.device.port = port;
    }

    match cli.command {
        Commands::Switch {
            bank,
            relay,
            state,
            wait_reply,
        } => {
            run_switch(&config, bank, relay, state.is_on(), wait_reply)?;
        }
        Commands::Discover => {
            run_discovery(&config)?;
        }
        Commands::Frame { bank, relay, state } => {
            let bank = Bank::new(bank)?;
            let relay = Relay::new(relay)?;
            let frame = protocol::build_frame(bank, relay, state.is_on());
            println!("{}", protocol::to_hex(&frame));
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

/// Connect to the controller and switch one relay
fn run_switch(
    config: &Config,
    bank: i64,
    relay: i64,
    on: bool,
    wait_reply: bool,
) -> anyhow::Result<()> {
    let mut device = config.device()?;

    if device.address().is_empty() {
        anyhow::bail!(
            "No NCD device found. Specify --address or set device.address in the config file"
        );
    }

    device.connect()?;

    if wait_reply {
        let reply = device.switch_relay_acked(bank, relay, on)?;
        println!("Reply: {}", reply);
    } else {
        device.switch_relay(bank, relay, on)?;
    }

    println!(
        "Relay {} of bank {} switched {} on {}:{}",
        relay,
        bank,
        if on { "on" } else { "off" },
        device.address(),
        device.port()
    );
    Ok(())
}

/// List controllers found in the neighbor table
fn run_discovery(config: &Config) -> anyhow::Result<()> {
    let resolver = config.discovery.resolver()?;

    println!("Scanning ARP table for prefix {}...\n", resolver.oui());

    let devices = match resolver.find_devices() {
        Ok(devices) => devices,
        Err(e) => {
            tracing::warn!("Neighbor table unavailable: {}", e);
            Vec::new()
        }
    };

    if devices.is_empty() {
        println!("No NCD devices found.");
        println!("Run the NCD configuration tool to troubleshoot connection issues.");
        return Ok(());
    }

    for (i, entry) in devices.iter().enumerate() {
        let marker = if i == 0 { " (default)" } else { "" };
        println!("  {:<16} {}{}", entry.ip, entry.mac, marker);
    }
    println!("\nPort: {}", config.device.port);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["ncd-relay", "discover"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_switch_arguments() {
        let cli = Cli::try_parse_from([
            "ncd-relay", "--address", "10.0.0.5", "-p", "2102", "switch", "0", "1", "on",
        ])
        .unwrap();
        assert_eq!(cli.address.as_deref(), Some("10.0.0.5"));
        assert_eq!(cli.port, Some(2102));
        match cli.command {
            Commands::Switch {
                bank,
                relay,
                state,
                wait_reply,
            } => {
                assert_eq!((bank, relay), (0, 1));
                assert_eq!(state, RelayState::On);
                assert!(!wait_reply);
            }
            _ => panic!("expected switch command"),
        }
    }

    #[test]
    fn test_negative_bank_reaches_validation() {
        let cli = Cli::try_parse_from(["ncd-relay", "frame", "-1", "2", "off"]).unwrap();
        match cli.command {
            Commands::Frame { bank, .. } => assert!(Bank::new(bank).is_err()),
            _ => panic!("expected frame command"),
        }
    }

    #[test]
    fn test_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["ncd-relay", "switch", "1", "1", "maybe"]).is_err());
    }
}
