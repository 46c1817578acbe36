#[cfg(test)]
mod tests {
    use crate::handler::{EchoHandler, NullHandler, RecordingHandler};
    use crate::metrics::ThroughputMetrics;
    use crate::source::ReaderSource;
    use crate::{ByteSource, Pump, PumpError, StopCause};
    use std::io::{self, Read};
    use std::sync::Arc;

    #[test]
    fn test_pump_delivers_in_order() {
        // Distinguishable values, including 0x00 and 0xFF: the sign of
        // the widened byte must never leak into delivery.
        let source = ReaderSource::new(&[0x41u8, 0x00, 0xFF][..]);
        let mut pump = Pump::new(source, RecordingHandler::new());

        let stats = pump.run().unwrap();

        assert_eq!(pump.handler().bytes(), &[0x41, 0x00, 0xFF]);
        assert_eq!(stats.bytes_delivered, 3);
        assert_eq!(stats.stop, StopCause::EndOfStream);
    }

    #[test]
    fn test_pump_empty_input() {
        let source = ReaderSource::new(&b""[..]);
        let mut pump = Pump::new(source, RecordingHandler::new());

        let stats = pump.run().unwrap();

        assert!(pump.handler().bytes().is_empty());
        assert_eq!(stats.bytes_delivered, 0);
        assert_eq!(stats.stop, StopCause::EndOfStream);
    }

    #[test]
    fn test_pump_abc_scenario() {
        let source = ReaderSource::new(&b"ABC"[..]);
        let mut pump = Pump::new(source, RecordingHandler::new());

        let stats = pump.run().unwrap();

        assert_eq!(pump.handler().bytes(), b"ABC");
        assert_eq!(stats.bytes_delivered, 3);
        assert_eq!(stats.stop, StopCause::EndOfStream);
    }

    #[test]
    fn test_pump_byte_limit_stops_cleanly() {
        let source = ReaderSource::new(&b"ABCDEF"[..]);
        let mut pump = Pump::new(source, RecordingHandler::new()).with_byte_limit(4);

        let stats = pump.run().unwrap();

        assert_eq!(pump.handler().bytes(), b"ABCD");
        assert_eq!(stats.bytes_delivered, 4);
        assert_eq!(stats.stop, StopCause::ByteLimit);
    }

    #[test]
    fn test_pump_zero_byte_limit() {
        let source = ReaderSource::new(&b"ABC"[..]);
        let mut pump = Pump::new(source, RecordingHandler::new()).with_byte_limit(0);

        let stats = pump.run().unwrap();

        assert!(pump.handler().bytes().is_empty());
        assert_eq!(stats.stop, StopCause::ByteLimit);
    }

    /// Yields its bytes, then fails every subsequent read.
    struct FailingSource {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl ByteSource for FailingSource {
        fn next_byte(&mut self) -> io::Result<Option<u8>> {
            if self.pos < self.bytes.len() {
                let b = self.bytes[self.pos];
                self.pos += 1;
                Ok(Some(b))
            } else {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "stimulus lost"))
            }
        }
    }

    #[test]
    fn test_pump_read_error_carries_delivery_count() {
        let source = FailingSource {
            bytes: vec![0x10, 0x20],
            pos: 0,
        };
        let mut pump = Pump::new(source, RecordingHandler::new());

        let err = pump.run().unwrap_err();

        // Bytes delivered before the failure still reached the handler.
        assert_eq!(pump.handler().bytes(), &[0x10, 0x20]);
        let PumpError::Read { delivered, source } = err;
        assert_eq!(delivered, 2);
        assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
    }

    /// Reader that reports `Interrupted` once before each real byte.
    struct InterruptingReader {
        inner: io::Cursor<Vec<u8>>,
        interrupt_next: bool,
    }

    impl Read for InterruptingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            self.interrupt_next = true;
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_reader_source_retries_interrupted() {
        let reader = InterruptingReader {
            inner: io::Cursor::new(b"XY".to_vec()),
            interrupt_next: true,
        };
        let mut pump = Pump::new(ReaderSource::new(reader), RecordingHandler::new());

        let stats = pump.run().unwrap();

        assert_eq!(pump.handler().bytes(), b"XY");
        assert_eq!(stats.stop, StopCause::EndOfStream);
    }

    #[test]
    fn test_echo_handler_writes_through() {
        let source = ReaderSource::new(&b"hi\n"[..]);
        let mut pump = Pump::new(source, EchoHandler::new(Vec::new()));

        pump.run().unwrap();

        let sink = pump.into_handler().into_inner();
        assert_eq!(sink, b"hi\n");
    }

    #[test]
    fn test_metrics_observer_counts_bytes() {
        let metrics = Arc::new(ThroughputMetrics::new());
        let source = ReaderSource::new(&b"12345"[..]);
        let mut pump = Pump::new(source, NullHandler);
        pump.add_observer(metrics.clone());

        let stats = pump.run().unwrap();

        assert_eq!(stats.bytes_delivered, 5);
        assert_eq!(metrics.bytes_delivered(), 5);

        metrics.reset();
        assert_eq!(metrics.bytes_delivered(), 0);
    }
}
