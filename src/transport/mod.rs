//! Abstract instrument transport interface.
use std::time::Duration;

use crate::error::Result;
use crate::protocol::Command;

pub use self::serial::SerialTransport;

#[cfg(test)]
pub(crate) mod mock;
mod serial;

/// Abstraction of the byte channel to the instrument.
/// Usually a serial port; tests use a scripted mock.
pub trait Transport {
    fn send_raw(&mut self, raw: &[u8]) -> Result<()>;
    /// Everything the instrument has sent so far, waiting at most `timeout`
    /// for the first byte. Returns an empty buffer if nothing arrived.
    fn recv_raw(&mut self, timeout: Duration) -> Result<Vec<u8>>;

    fn send_command(&mut self, cmd: &Command) -> Result<()> {
        let req = cmd.to_frame()?;
        log::debug!("=> {}", req);
        self.send_raw(req.as_bytes())
    }
}
