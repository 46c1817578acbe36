use crate::ByteHandler;
use std::io::Write;

/// Discards every byte. Useful when only pump behavior is under test.
#[derive(Debug, Default)]
pub struct NullHandler;

impl ByteHandler for NullHandler {
    fn on_byte(&mut self, _byte: u8) {}
}

/// Echoes each byte through to a sink, flushed per byte.
/// Desktop stand-in for the firmware's serial echo path.
#[derive(Debug)]
pub struct EchoHandler<W> {
    out: W,
}

impl<W: Write> EchoHandler<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ByteHandler for EchoHandler<W> {
    fn on_byte(&mut self, byte: u8) {
        // The handler seam has no error channel; a broken sink must not
        // stall the pump.
        if let Err(e) = self.out.write_all(&[byte]).and_then(|_| self.out.flush()) {
            tracing::warn!("echo sink write failed: {}", e);
        }
    }
}

/// Records every delivered byte for later inspection.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    bytes: Vec<u8>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl ByteHandler for RecordingHandler {
    fn on_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}
