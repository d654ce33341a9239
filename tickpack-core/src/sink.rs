//! Concrete sink implementations.
//!
//! - [`VecSink`]: accumulates everything in a growable vector.
//! - [`BufferSink`]: writes into a caller-provided slice and fails instead of
//!   overflowing it.
//! - [`WriterSink`]: forwards to any [`std::io::Write`] implementation.
//!
//! None of these buffer internally, so `flush` and `finish` only reach the
//! underlying resource where one exists.

use crate::error::{Result, TickpackError};
use crate::traits::Sink;
use std::io::Write;

/// A sink that appends all bytes to an owned vector.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    out: Vec<u8>,
}

impl VecSink {
    /// Create an empty `VecSink`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty `VecSink` with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Consume the sink and return the accumulated bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.out
    }
}

impl Sink for VecSink {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.out.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A sink that writes into a fixed-capacity, caller-owned buffer.
///
/// A write that would not fit fails with
/// [`TickpackError::CapacityExceeded`] and leaves the buffer untouched.
#[derive(Debug)]
pub struct BufferSink<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl<'a> BufferSink<'a> {
    /// Create a sink over `dst`. The capacity is `dst.len()`.
    pub fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.dst.len()
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.dst.len() - self.pos
    }

    /// The written prefix of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.dst[..self.pos]
    }
}

impl Sink for BufferSink<'_> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(TickpackError::capacity_exceeded(
                self.capacity(),
                self.pos.saturating_add(data.len()),
            ));
        }
        let end = self.pos + data.len();
        self.dst[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A sink that forwards to an [`std::io::Write`] implementation.
///
/// Both `flush` and `finish` flush the writer; the writer itself is not
/// closed.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Create a new `WriterSink` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume this `WriterSink` and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for WriterSink<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_vec_sink_appends_in_order() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.write(&[1, 2, 3]).unwrap();
        sink.flush().unwrap();
        sink.write(&[]).unwrap();
        sink.write(&[4]).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.len(), 4);
        assert_eq!(sink.into_inner(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_buffer_sink_exact_capacity() {
        let mut storage = [0u8; 8];
        let mut sink = BufferSink::new(&mut storage);
        sink.write(&[0xAA; 5]).unwrap();
        sink.write(&[0xBB; 3]).unwrap();
        assert_eq!(sink.remaining(), 0);
        sink.finish().unwrap();
        assert_eq!(sink.as_bytes(), &[0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xBB, 0xBB, 0xBB]);
    }

    #[test]
    fn test_buffer_sink_overflow_single_call() {
        let mut storage = [0u8; 4];
        let mut sink = BufferSink::new(&mut storage);
        let err = sink.write(&[1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(
            err,
            TickpackError::CapacityExceeded {
                capacity: 4,
                requested: 5
            }
        ));
        assert!(sink.is_empty());
        assert_eq!(storage, [0u8; 4]);
    }

    #[test]
    fn test_buffer_sink_overflow_split_calls() {
        let mut storage = [0u8; 4];
        let mut sink = BufferSink::new(&mut storage);
        sink.write(&[1, 2, 3]).unwrap();
        assert!(sink.write(&[4, 5]).is_err());
        // Nothing from the failed write lands in the buffer.
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.as_bytes(), &[1, 2, 3]);
        drop(sink);
        assert_eq!(storage, [1, 2, 3, 0]);
    }

    #[test]
    fn test_writer_sink_forwards_and_flushes() {
        let mut sink = WriterSink::new(io::Cursor::new(Vec::new()));
        sink.write(b"tick").unwrap();
        sink.flush().unwrap();
        sink.write(b"pack").unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.into_inner().into_inner(), b"tickpack");
    }

    #[test]
    fn test_writer_sink_propagates_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = WriterSink::new(Broken);
        assert!(matches!(sink.write(b"x"), Err(TickpackError::Io(_))));
    }
}
