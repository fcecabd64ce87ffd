//! Serial Transportation.
use std::{
    io::{self, Read, Write},
    time::{Duration, Instant},
};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::Transport;
use crate::constants::SENTINEL;
use crate::error::Result;

const READ_CHUNK: usize = 64;

pub struct SerialTransport {
    serial_port: Box<dyn SerialPort>,
}

impl SerialTransport {
    pub fn scan_ports() -> Result<Vec<String>> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    /// Open `port` at `baud_rate`, 8N1 without flow control.
    pub fn open(port: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        log::info!("Opening serial port: \"{}\" @ {} baud", port, baud_rate);
        let port = serialport::new(port, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;
        Ok(SerialTransport { serial_port: port })
    }
}

impl Transport for SerialTransport {
    fn send_raw(&mut self, raw: &[u8]) -> Result<()> {
        self.serial_port.write_all(raw)?;
        self.serial_port.flush()?;
        Ok(())
    }

    fn recv_raw(&mut self, timeout: Duration) -> Result<Vec<u8>> {
        let port = &mut self.serial_port;
        let mut buf = read_until_sentinel(timeout, |chunk, remaining| {
            port.set_timeout(remaining)?;
            port.read(chunk)
        })?;
        // Pick up anything queued behind the terminated message.
        loop {
            let pending = port.bytes_to_read()? as usize;
            if pending == 0 {
                break;
            }
            let mut rest = vec![0u8; pending];
            let n = port.read(&mut rest)?;
            buf.extend_from_slice(&rest[..n]);
        }
        Ok(buf)
    }
}

/// Keep reading until a sentinel has arrived or `timeout` has elapsed.
///
/// `read` gets the chunk to fill and the time left before the deadline.
/// A timed out read ends the loop with whatever was collected so far.
fn read_until_sentinel<F>(timeout: Duration, mut read: F) -> io::Result<Vec<u8>>
where
    F: FnMut(&mut [u8], Duration) -> io::Result<usize>,
{
    let deadline = Instant::now() + timeout;
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match read(&mut chunk, remaining) {
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if chunk[..n].contains(&SENTINEL) {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) => return Err(e),
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Serves scripted pieces of a reply, then times out.
    fn trickle(pieces: &[&str]) -> impl FnMut(&mut [u8], Duration) -> io::Result<usize> {
        let mut pieces: VecDeque<Vec<u8>> = pieces.iter().map(|p| p.as_bytes().to_vec()).collect();
        move |chunk, _| match pieces.pop_front() {
            Some(piece) => {
                chunk[..piece.len()].copy_from_slice(&piece);
                Ok(piece.len())
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
        }
    }

    #[test]
    fn reply_split_across_reads_is_reassembled() {
        let buf = read_until_sentinel(
            Duration::from_secs(1),
            trickle(&["/", "AK2", "710", "3.", "/AK"]),
        )
        .unwrap();
        assert_eq!(buf, b"/AK27103.");
    }

    #[test]
    fn silence_yields_empty_buffer() {
        let buf = read_until_sentinel(Duration::from_secs(1), trickle(&[])).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn unterminated_reply_is_returned_on_timeout() {
        let buf =
            read_until_sentinel(Duration::from_secs(1), trickle(&["/AK27", "10"])).unwrap();
        assert_eq!(buf, b"/AK2710");
    }

    #[test]
    fn zero_timeout_reads_nothing() {
        let buf = read_until_sentinel(Duration::ZERO, trickle(&["/AK27103."])).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn read_errors_propagate() {
        let err = read_until_sentinel(Duration::from_secs(1), |_, _| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
