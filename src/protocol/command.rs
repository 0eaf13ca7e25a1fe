//! Relay command definitions
//!
//! Range-checked bank and relay identifiers, the decoded form of a command
//! frame, and the raw device reply.

use std::fmt;

use thiserror::Error;

use super::{MAX_BANK, MAX_RELAYS_PER_BANK, RX_MSG_LEN};

/// Bank or relay number outside the range the device accepts
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid bank address: {0} (expected 0..=32)")]
    InvalidBank(i64),

    #[error("invalid relay address: {0} (expected 1..=8)")]
    InvalidRelay(i64),
}

/// A relay bank selector, 0 through 32
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bank(u8);

impl Bank {
    /// Broadcast to every bank on the controller
    pub const ALL: Bank = Bank(0);

    pub fn new(bank: i64) -> Result<Self, AddressError> {
        if (0..=i64::from(MAX_BANK)).contains(&bank) {
            Ok(Self(bank as u8))
        } else {
            Err(AddressError::InvalidBank(bank))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_all(self) -> bool {
        self == Self::ALL
    }
}

impl TryFrom<i64> for Bank {
    type Error = AddressError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            write!(f, "all banks")
        } else {
            write!(f, "bank {}", self.0)
        }
    }
}

/// A relay within a bank, 1 through 8
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Relay(u8);

impl Relay {
    pub const R1: Relay = Relay(1);
    pub const R2: Relay = Relay(2);
    pub const R3: Relay = Relay(3);
    pub const R4: Relay = Relay(4);
    pub const R5: Relay = Relay(5);
    pub const R6: Relay = Relay(6);
    pub const R7: Relay = Relay(7);
    pub const R8: Relay = Relay(8);

    pub fn new(relay: i64) -> Result<Self, AddressError> {
        if (1..=i64::from(MAX_RELAYS_PER_BANK)).contains(&relay) {
            Ok(Self(relay as u8))
        } else {
            Err(AddressError::InvalidRelay(relay))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every relay in a bank, in ascending order
    pub fn all() -> impl Iterator<Item = Relay> {
        (1..=MAX_RELAYS_PER_BANK).map(Relay)
    }
}

impl TryFrom<i64> for Relay {
    type Error = AddressError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay {}", self.0)
    }
}

/// A single relay switch request, as carried by one command frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayCommand {
    pub bank: Bank,
    pub relay: Relay,
    pub on: bool,
}

impl RelayCommand {
    pub fn new(bank: Bank, relay: Relay, on: bool) -> Self {
        Self { bank, relay, on }
    }

    pub fn on(bank: Bank, relay: Relay) -> Self {
        Self::new(bank, relay, true)
    }

    pub fn off(bank: Bank, relay: Relay) -> Self {
        Self::new(bank, relay, false)
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.on { "on" } else { "off" };
        write!(f, "{} {} {}", self.bank, self.relay, state)
    }
}

/// Raw reply frame sent back by the controller.
///
/// The layout of these bytes is device firmware specific and is not
/// interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply(pub [u8; RX_MSG_LEN]);

impl Reply {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::to_hex(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_range() {
        assert_eq!(Bank::new(0).unwrap(), Bank::ALL);
        assert_eq!(Bank::new(32).unwrap().get(), 32);
        assert_eq!(Bank::new(-1), Err(AddressError::InvalidBank(-1)));
        assert_eq!(Bank::new(33), Err(AddressError::InvalidBank(33)));
    }

    #[test]
    fn test_relay_range() {
        assert_eq!(Relay::new(1).unwrap(), Relay::R1);
        assert_eq!(Relay::new(8).unwrap(), Relay::R8);
        assert_eq!(Relay::new(0), Err(AddressError::InvalidRelay(0)));
        assert_eq!(Relay::new(9), Err(AddressError::InvalidRelay(9)));
    }

    #[test]
    fn test_relay_all() {
        let relays: Vec<u8> = Relay::all().map(Relay::get).collect();
        assert_eq!(relays, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_display() {
        let cmd = RelayCommand::on(Bank::new(3).unwrap(), Relay::R2);
        assert_eq!(cmd.to_string(), "bank 3 relay 2 on");
        assert_eq!(RelayCommand::off(Bank::ALL, Relay::R8).to_string(), "all banks relay 8 off");
        assert_eq!(Reply([0xAA, 0x01, 0x55, 0x00]).to_string(), "AA 01 55 00");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AddressError::InvalidBank(33).to_string(),
            "invalid bank address: 33 (expected 0..=32)"
        );
        assert_eq!(
            AddressError::InvalidRelay(0).to_string(),
            "invalid relay address: 0 (expected 1..=8)"
        );
    }
}
