pub mod handler;
pub mod metrics;
pub mod pump;
pub mod source;

mod tests;

pub use pump::{Pump, PumpStats, StopCause};

#[derive(Debug, thiserror::Error)]
pub enum PumpError {
    #[error("input read failed after {delivered} byte(s): {source}")]
    Read {
        delivered: u64,
        #[source]
        source: std::io::Error,
    },
}

pub type PumpResult<T> = Result<T, PumpError>;

/// Byte-oriented input seam for the pump.
///
/// `Ok(Some(b))` yields the next byte, `Ok(None)` signals end-of-stream,
/// `Err` is an unrecoverable read failure. End-of-stream is terminal:
/// the pump never calls `next_byte` again after receiving `Ok(None)`.
pub trait ByteSource {
    fn next_byte(&mut self) -> std::io::Result<Option<u8>>;
}

/// The external entry point driven by the pump: one byte per call,
/// invoked synchronously in input order. The contract consumes no
/// return value, so implementations own their error handling.
pub trait ByteHandler {
    fn on_byte(&mut self, byte: u8);
}

/// Trait for observing pump events in a modular way.
pub trait PumpObserver: std::fmt::Debug + Send + Sync {
    fn on_pump_start(&self) {}
    fn on_pump_stop(&self) {}
    fn on_byte_delivered(&self, _byte: u8) {}
}
