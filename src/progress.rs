//! Byte-based progress tracking for input readers.

use std::io::Read;

/// A reader wrapper that tracks bytes read and calls a progress callback.
///
/// Wraps the raw file, before decompression, so the reported position can be
/// compared against the on-disk file size.
pub struct ProgressReader<R: Read> {
    reader: R,
    callback: Box<dyn Fn(u64)>,
    bytes_read: u64,
}

impl<R: Read> ProgressReader<R> {
    /// The callback receives the total bytes read so far after each read.
    pub fn new<F>(reader: R, callback: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            reader,
            callback: Box::new(callback),
            bytes_read: 0,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.bytes_read += n as u64;
        (self.callback)(self.bytes_read);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_reports_cumulative_bytes() {
        let seen = Rc::new(Cell::new(0u64));
        let sink = seen.clone();
        let mut reader = ProgressReader::new(&b"hello world"[..], move |n| sink.set(n));

        let mut buf = [0u8; 4];
        reader.read(&mut buf).unwrap();
        assert_eq!(seen.get(), 4);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).unwrap();
        assert_eq!(seen.get(), 11);
    }
}
