use crate::ByteSource;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Adapts any [`Read`] impl to the pump's byte-at-a-time contract.
///
/// A zero-length read maps to end-of-stream; `Interrupted` reads are
/// retried transparently, every other error surfaces unchanged.
#[derive(Debug)]
pub struct ReaderSource<R> {
    inner: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Source over the process's standard input stream.
pub fn stdin_source() -> ReaderSource<io::Stdin> {
    ReaderSource::new(io::stdin())
}

/// Buffered source over a stimulus file.
pub fn file_source<P: AsRef<Path>>(path: P) -> io::Result<ReaderSource<BufReader<File>>> {
    Ok(ReaderSource::new(BufReader::new(File::open(path)?)))
}
