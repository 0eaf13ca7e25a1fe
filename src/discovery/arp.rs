//! Platform neighbor table sources
//!
//! - Windows: `arp -a`
//! - Linux: `/proc/net/arp`, then `arp -an` if the file cannot be read
//! - Other Unix: `arp -an`

use std::path::PathBuf;
use std::process::Command;

use super::{DiscoveryError, DiscoveryResult, NeighborTable};

/// Neighbor table read from the output of the system `arp` tool
#[derive(Debug, Clone)]
pub struct ArpCommand {
    program: String,
    args: Vec<String>,
}

impl ArpCommand {
    pub fn new(args: &[&str]) -> Self {
        Self {
            program: "arp".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Use a different executable, e.g. an absolute path to `arp`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl NeighborTable for ArpCommand {
    fn name(&self) -> &'static str {
        "arp command"
    }

    fn read(&self) -> DiscoveryResult<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| DiscoveryError::Command {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DiscoveryError::Command {
                program: self.program.clone(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Linux kernel neighbor table exposed under procfs
#[derive(Debug, Clone)]
pub struct ProcNetArp {
    path: PathBuf,
}

impl ProcNetArp {
    pub fn new() -> Self {
        Self::at("/proc/net/arp")
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNetArp {
    fn default() -> Self {
        Self::new()
    }
}

impl NeighborTable for ProcNetArp {
    fn name(&self) -> &'static str {
        "/proc/net/arp"
    }

    fn read(&self) -> DiscoveryResult<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}

/// Neighbor tables for the current platform, in order of preference
#[cfg(target_os = "windows")]
pub fn platform_tables() -> Vec<Box<dyn NeighborTable>> {
    vec![Box::new(ArpCommand::new(&["-a"]))]
}

/// Neighbor tables for the current platform, in order of preference
#[cfg(target_os = "linux")]
pub fn platform_tables() -> Vec<Box<dyn NeighborTable>> {
    vec![
        Box::new(ProcNetArp::new()),
        Box::new(ArpCommand::new(&["-an"])),
    ]
}

/// Neighbor tables for the current platform, in order of preference
#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub fn platform_tables() -> Vec<Box<dyn NeighborTable>> {
    vec![Box::new(ArpCommand::new(&["-an"]))]
}
