//! Exact-length transfers over a byte stream
//!
//! TCP may accept or deliver fewer bytes than asked for. These helpers loop
//! until the whole message has moved, and treat a zero-length transfer as the
//! peer closing the connection.

use bytes::{Bytes, BytesMut};
use std::io::{self, ErrorKind, Read, Write};
use thiserror::Error;

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Socket connection broken: {transferred} of {expected} bytes {direction}")]
    ConnectionBroken {
        direction: Direction,
        transferred: usize,
        expected: usize,
    },

    #[error("Timed out after {transferred} of {expected} bytes {direction}")]
    Timeout {
        direction: Direction,
        transferred: usize,
        expected: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Which way a transfer was going when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Sent => f.write_str("sent"),
            Direction::Received => f.write_str("received"),
        }
    }
}

fn map_io_error(
    e: io::Error,
    direction: Direction,
    transferred: usize,
    expected: usize,
) -> TransportError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout {
            direction,
            transferred,
            expected,
        },
        _ => TransportError::Io(e),
    }
}

/// Write all of `data`, looping over partial writes
pub fn send_exact<W: Write + ?Sized>(writer: &mut W, data: &[u8]) -> TransportResult<()> {
    let expected = data.len();
    let mut total_sent = 0;

    while total_sent < expected {
        match writer.write(&data[total_sent..]) {
            Ok(0) => {
                return Err(TransportError::ConnectionBroken {
                    direction: Direction::Sent,
                    transferred: total_sent,
                    expected,
                });
            }
            Ok(n) => total_sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io_error(e, Direction::Sent, total_sent, expected)),
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read exactly `length` bytes, concatenating chunks in arrival order
pub fn receive_exact<R: Read + ?Sized>(reader: &mut R, length: usize) -> TransportResult<Bytes> {
    let mut received = BytesMut::with_capacity(length);
    let mut chunk = [0u8; 256];

    while received.len() < length {
        let want = (length - received.len()).min(chunk.len());
        match reader.read(&mut chunk[..want]) {
            Ok(0) => {
                return Err(TransportError::ConnectionBroken {
                    direction: Direction::Received,
                    transferred: received.len(),
                    expected: length,
                });
            }
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(map_io_error(e, Direction::Received, received.len(), length));
            }
        }
    }

    Ok(received.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Stream that moves at most `step` bytes per call and reports EOF
    /// (or a zero-length write) once `limit` bytes have been transferred.
    struct Trickle {
        input: VecDeque<u8>,
        output: Vec<u8>,
        step: usize,
        limit: usize,
        interrupt_first: bool,
    }

    impl Trickle {
        fn new(input: &[u8], step: usize) -> Self {
            Self {
                input: input.iter().copied().collect(),
                output: Vec::new(),
                step,
                limit: usize::MAX,
                interrupt_first: false,
            }
        }
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_first {
                self.interrupt_first = false;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(self.step).min(self.input.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.input.pop_front().unwrap();
            }
            Ok(n)
        }
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.interrupt_first {
                self.interrupt_first = false;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let room = self.limit.saturating_sub(self.output.len());
            let n = buf.len().min(self.step).min(room);
            self.output.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct TimedOut;

    impl Read for TimedOut {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(ErrorKind::WouldBlock))
        }
    }

    #[test]
    fn test_send_one_byte_at_a_time() {
        let mut stream = Trickle::new(&[], 1);
        let frame = [0xAA, 0x03, 0xFE, 0x6C, 0x00, 0x17];
        send_exact(&mut stream, &frame).unwrap();
        assert_eq!(stream.output, frame);
    }

    #[test]
    fn test_receive_one_byte_at_a_time() {
        let mut stream = Trickle::new(&[0x01, 0x02, 0x03, 0x04, 0x05], 1);
        let reply = receive_exact(&mut stream, 4).unwrap();
        assert_eq!(&reply[..], &[0x01, 0x02, 0x03, 0x04]);
        // The fifth byte is left for the next read
        assert_eq!(stream.input.len(), 1);
    }

    #[test]
    fn test_receive_uneven_chunks() {
        let data: Vec<u8> = (0..100).collect();
        let mut stream = Trickle::new(&data, 7);
        let received = receive_exact(&mut stream, 100).unwrap();
        assert_eq!(&received[..], &data[..]);
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut stream = Trickle::new(&[9, 8, 7, 6], 2);
        stream.interrupt_first = true;
        assert_eq!(&receive_exact(&mut stream, 4).unwrap()[..], &[9, 8, 7, 6]);

        let mut stream = Trickle::new(&[], 2);
        stream.interrupt_first = true;
        send_exact(&mut stream, &[1, 2, 3]).unwrap();
        assert_eq!(stream.output, vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_length_write_breaks_connection() {
        let mut stream = Trickle::new(&[], 1);
        stream.limit = 3;
        let err = send_exact(&mut stream, &[0xAA, 0x03, 0xFE, 0x6C, 0x00, 0x17]).unwrap_err();
        match err {
            TransportError::ConnectionBroken {
                direction,
                transferred,
                expected,
            } => {
                assert_eq!(direction, Direction::Sent);
                assert_eq!(transferred, 3);
                assert_eq!(expected, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_early_eof_breaks_connection() {
        let mut stream = Trickle::new(&[0x01, 0x02], 1);
        let err = receive_exact(&mut stream, 4).unwrap_err();
        assert!(matches!(
            err,
            TransportError::ConnectionBroken {
                direction: Direction::Received,
                transferred: 2,
                expected: 4,
            }
        ));
    }

    #[test]
    fn test_zero_length_request_does_no_io() {
        let mut stream = Trickle::new(&[], 1);
        stream.limit = 0;
        send_exact(&mut stream, &[]).unwrap();
        assert!(receive_exact(&mut stream, 0).unwrap().is_empty());
    }

    #[test]
    fn test_timeout_is_reported() {
        let err = receive_exact(&mut TimedOut, 4).unwrap_err();
        assert!(matches!(
            err,
            TransportError::Timeout {
                direction: Direction::Received,
                transferred: 0,
                ..
            }
        ));
    }
}
