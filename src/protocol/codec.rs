//! Protocol codec for encoding/decoding relay command frames
//!
//! Encoding is infallible once bank and relay are validated. Decoding is the
//! device side of the exchange and is strict about every byte.

use thiserror::Error;

use super::{
    Bank, Relay, RelayCommand, BASE_OFF_COMMAND, BASE_ON_COMMAND, CMD_HEADER, MAX_RELAYS_PER_BANK,
    MSG_PAYLOAD_LEN, MSG_SOH, TX_MSG_LEN,
};

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid frame length: {0} bytes (expected 6)")]
    InvalidLength(usize),

    #[error("Invalid frame marker at byte {index}: {found:#04x} (expected {expected:#04x})")]
    InvalidMarker { index: usize, found: u8, expected: u8 },

    #[error("Unknown opcode: {0:#04x}")]
    UnknownOpcode(u8),

    #[error("Invalid bank in frame: {0}")]
    InvalidBank(u8),

    #[error("Checksum mismatch: frame carries {found:#04x}, computed {computed:#04x}")]
    ChecksumMismatch { found: u8, computed: u8 },
}

/// Compute the frame checksum: the sum of all bytes, modulo 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Opcode selecting a relay and the on/off action
pub fn opcode(relay: Relay, on: bool) -> u8 {
    let base = if on { BASE_ON_COMMAND } else { BASE_OFF_COMMAND };
    base + relay.get()
}

/// Build the 6-byte frame switching `relay` of `bank` on or off
pub fn build_frame(bank: Bank, relay: Relay, on: bool) -> [u8; TX_MSG_LEN] {
    let mut frame = [
        MSG_SOH,
        MSG_PAYLOAD_LEN,
        CMD_HEADER,
        opcode(relay, on),
        bank.get(),
        0,
    ];
    frame[TX_MSG_LEN - 1] = checksum(&frame[..TX_MSG_LEN - 1]);
    frame
}

/// Encode a relay command into its wire frame
pub fn encode(command: &RelayCommand) -> [u8; TX_MSG_LEN] {
    build_frame(command.bank, command.relay, command.on)
}

/// Decode a command frame back into the relay command it carries
pub fn decode_frame(frame: &[u8]) -> Result<RelayCommand, CodecError> {
    if frame.len() != TX_MSG_LEN {
        return Err(CodecError::InvalidLength(frame.len()));
    }

    for (index, expected) in [MSG_SOH, MSG_PAYLOAD_LEN, CMD_HEADER].into_iter().enumerate() {
        if frame[index] != expected {
            return Err(CodecError::InvalidMarker {
                index,
                found: frame[index],
                expected,
            });
        }
    }

    let computed = checksum(&frame[..TX_MSG_LEN - 1]);
    let found = frame[TX_MSG_LEN - 1];
    if computed != found {
        return Err(CodecError::ChecksumMismatch { found, computed });
    }

    let op = frame[3];
    let (on, relay) = if op > BASE_ON_COMMAND && op <= BASE_ON_COMMAND + MAX_RELAYS_PER_BANK {
        (true, op - BASE_ON_COMMAND)
    } else if op > BASE_OFF_COMMAND && op <= BASE_OFF_COMMAND + MAX_RELAYS_PER_BANK {
        (false, op - BASE_OFF_COMMAND)
    } else {
        return Err(CodecError::UnknownOpcode(op));
    };

    let bank = Bank::new(i64::from(frame[4])).map_err(|_| CodecError::InvalidBank(frame[4]))?;
    let relay = Relay::new(i64::from(relay)).map_err(|_| CodecError::UnknownOpcode(op))?;

    Ok(RelayCommand::new(bank, relay, on))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_modular_sum() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x02, 0x03]), 0x06);
        assert_eq!(checksum(&[0xFF, 0x01]), 0x00);
        assert_eq!(checksum(&[0xFF, 0xFF, 0xFF]), 0xFD);

        let long: Vec<u8> = (0..=255u8).collect();
        let expected = (long.iter().map(|b| *b as u32).sum::<u32>() % 256) as u8;
        assert_eq!(checksum(&long), expected);
    }

    #[test]
    fn test_checksum_ignores_order() {
        let bytes = [0xAA, 0x03, 0xFE, 0x6C, 0x05];
        let mut reversed = bytes;
        reversed.reverse();
        let rotated = [0x6C, 0x05, 0xAA, 0x03, 0xFE];
        assert_eq!(checksum(&bytes), checksum(&reversed));
        assert_eq!(checksum(&bytes), checksum(&rotated));
    }

    #[test]
    fn test_opcode_table() {
        assert_eq!(BASE_ON_COMMAND, 0x6B);
        assert_eq!(opcode(Relay::R1, false), 0x64);
        assert_eq!(opcode(Relay::R8, false), 0x6B);
        assert_eq!(opcode(Relay::R1, true), 0x6C);
        assert_eq!(opcode(Relay::R8, true), 0x73);
    }

    #[test]
    fn test_frame_layout_for_every_address() {
        for bank in 0..=32 {
            let bank = Bank::new(bank).unwrap();
            for relay in Relay::all() {
                for on in [true, false] {
                    let frame = build_frame(bank, relay, on);
                    assert_eq!(frame.len(), TX_MSG_LEN);
                    assert_eq!(&frame[..3], &[0xAA, 0x03, 0xFE]);
                    let base = if on { 0x6B } else { 0x63 };
                    assert_eq!(frame[3], base + relay.get());
                    assert_eq!(frame[4], bank.get());
                    assert_eq!(frame[5], checksum(&frame[..5]));
                }
            }
        }
    }

    #[test]
    fn test_all_banks_relay_one_on() {
        let frame = build_frame(Bank::ALL, Relay::R1, true);
        assert_eq!(frame, [0xAA, 0x03, 0xFE, 0x6C, 0x00, 0x17]);
    }

    #[test]
    fn test_decode_encoded_command() {
        let command = RelayCommand::off(Bank::new(12).unwrap(), Relay::R5);
        let frame = encode(&command);
        assert_eq!(decode_frame(&frame), Ok(command));
    }

    #[test]
    fn test_decode_rejects_bad_frames() {
        assert_eq!(decode_frame(&[0xAA, 0x03]), Err(CodecError::InvalidLength(2)));

        let mut frame = build_frame(Bank::ALL, Relay::R3, true);
        frame[2] = 0xFD;
        assert!(matches!(
            decode_frame(&frame),
            Err(CodecError::InvalidMarker { index: 2, found: 0xFD, expected: 0xFE })
        ));

        let mut frame = build_frame(Bank::ALL, Relay::R3, true);
        frame[5] = frame[5].wrapping_add(1);
        assert!(matches!(decode_frame(&frame), Err(CodecError::ChecksumMismatch { .. })));

        let mut frame = [0xAA, 0x03, 0xFE, 0x63, 0x00, 0x00];
        frame[5] = checksum(&frame[..5]);
        assert_eq!(decode_frame(&frame), Err(CodecError::UnknownOpcode(0x63)));

        let mut frame = [0xAA, 0x03, 0xFE, 0x6C, 33, 0x00];
        frame[5] = checksum(&frame[..5]);
        assert_eq!(decode_frame(&frame), Err(CodecError::InvalidBank(33)));
    }
}
