//! Scripted transport for exercising the generator without hardware.
use std::{collections::VecDeque, io, time::Duration};

use super::Transport;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct MockTransport {
    /// Frames written, one entry per `send_raw` call.
    pub sent: Vec<String>,
    /// Buffers handed out by successive `recv_raw` calls.
    replies: VecDeque<Vec<u8>>,
    fail_writes: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&mut self, raw: &[u8]) {
        self.replies.push_back(raw.to_vec());
    }

    pub fn fail_writes(&mut self) {
        self.fail_writes = true;
    }
}

impl Transport for MockTransport {
    fn send_raw(&mut self, raw: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "port closed").into());
        }
        self.sent.push(String::from_utf8_lossy(raw).into_owned());
        Ok(())
    }

    fn recv_raw(&mut self, _timeout: Duration) -> Result<Vec<u8>> {
        Ok(self.replies.pop_front().unwrap_or_default())
    }
}
