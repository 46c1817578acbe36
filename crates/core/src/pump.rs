use crate::{ByteHandler, ByteSource, PumpError, PumpObserver, PumpResult};
use std::sync::Arc;

/// Why the pump stopped cleanly. Read failures are not a stop cause,
/// they surface as [`PumpError::Read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// The source reported no more input.
    EndOfStream,
    /// The configured byte limit was reached before end-of-stream.
    ByteLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub bytes_delivered: u64,
    pub stop: StopCause,
}

/// The input pump: bridges a [`ByteSource`] to a [`ByteHandler`],
/// one byte at a time, in strict arrival order.
///
/// Fully synchronous and single-threaded. The handler call is inline;
/// the next read does not start until the handler returns.
pub struct Pump<S, H> {
    source: S,
    handler: H,
    byte_limit: Option<u64>,
    observers: Vec<Arc<dyn PumpObserver>>,
}

impl<S: ByteSource, H: ByteHandler> Pump<S, H> {
    pub fn new(source: S, handler: H) -> Self {
        Self {
            source,
            handler,
            byte_limit: None,
            observers: Vec::new(),
        }
    }

    /// Cap the number of bytes delivered to the handler. Stopping at the
    /// cap is a clean stop ([`StopCause::ByteLimit`]), not an error.
    pub fn with_byte_limit(mut self, limit: u64) -> Self {
        self.byte_limit = Some(limit);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn PumpObserver>) {
        self.observers.push(observer);
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Run the read/dispatch loop to completion.
    ///
    /// Every byte read from the source is delivered to the handler
    /// exactly once, in read order. The end-of-stream sentinel is
    /// consumed internally and never forwarded.
    pub fn run(&mut self) -> PumpResult<PumpStats> {
        for observer in &self.observers {
            observer.on_pump_start();
        }

        let mut delivered: u64 = 0;
        let stop = loop {
            if let Some(limit) = self.byte_limit {
                if delivered >= limit {
                    break StopCause::ByteLimit;
                }
            }

            match self.source.next_byte() {
                Ok(Some(byte)) => {
                    tracing::trace!("byte {:#04x} -> handler", byte);
                    self.handler.on_byte(byte);
                    delivered += 1;
                    for observer in &self.observers {
                        observer.on_byte_delivered(byte);
                    }
                }
                Ok(None) => break StopCause::EndOfStream,
                Err(source) => {
                    for observer in &self.observers {
                        observer.on_pump_stop();
                    }
                    return Err(PumpError::Read { delivered, source });
                }
            }
        };

        for observer in &self.observers {
            observer.on_pump_stop();
        }

        tracing::debug!("pump stopped: {:?} after {} byte(s)", stop, delivered);
        Ok(PumpStats {
            bytes_delivered: delivered,
            stop,
        })
    }
}
