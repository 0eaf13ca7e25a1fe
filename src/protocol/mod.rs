//! Protocol module - Defines the NCD relay controller wire protocol
//!
//! Every command is a fixed 6-byte frame:
//! - 1 byte start of header (0xAA)
//! - 1 byte payload length (0x03)
//! - 1 byte command header (0xFE)
//! - 1 byte opcode (base on/off command + relay number)
//! - 1 byte bank (0 addresses all banks)
//! - 1 byte checksum (sum of the previous bytes, modulo 256)
//!
//! The controller answers with a 4-byte reply.

mod codec;
mod command;

pub use codec::*;
pub use command::*;

/// Default TCP port NCD ethernet controllers listen on
pub const DEFAULT_PORT: u16 = 2101;

/// Length of an outbound command frame
pub const TX_MSG_LEN: usize = 6;

/// Length of an inbound reply frame
pub const RX_MSG_LEN: usize = 4;

/// Relays addressable within one bank
pub const MAX_RELAYS_PER_BANK: u8 = 8;

/// Highest bank number; bank 0 broadcasts to all banks
pub const MAX_BANK: u8 = 32;

/// Start of header marker
pub const MSG_SOH: u8 = 0xAA;

/// Payload length marker (header + opcode + bank)
pub const MSG_PAYLOAD_LEN: u8 = 0x03;

/// Command header marker
pub const CMD_HEADER: u8 = 0xFE;

/// Opcode base for switching a relay off; relay N is `BASE_OFF_COMMAND + N`
pub const BASE_OFF_COMMAND: u8 = 0x63;

/// Opcode base for switching a relay on; relay N is `BASE_ON_COMMAND + N`
pub const BASE_ON_COMMAND: u8 = BASE_OFF_COMMAND + MAX_RELAYS_PER_BANK;

/// Format bytes as space separated upper-case hex
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
