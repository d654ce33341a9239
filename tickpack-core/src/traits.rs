//! Core traits for byte pipelines.
//!
//! This module defines the [`Sink`] contract that every pipeline stage
//! implements, and the [`FlushMode`] directive used by streaming stages that
//! sit between the bit writer and the final destination.

use crate::error::Result;

/// How far a streaming stage should push its pending output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// Buffer data for best compression.
    #[default]
    Continue,
    /// Emit all pending output at a decodable boundary, keep the stream open.
    Flush,
    /// Emit all pending output and close the stream.
    End,
}

/// A byte-consuming endpoint.
///
/// A sink accepts a sequence of bytes and may buffer them internally.
/// `flush` pushes buffered bytes to whatever sits beneath the sink without
/// ending the logical stream; `finish` pushes the remaining bytes and closes
/// the stream permanently.
///
/// Implementations are single-owner and not reentrant. Decorating sinks hold
/// a borrow of their downstream, so the downstream always outlives them.
pub trait Sink {
    /// Append `data` to the logical stream.
    ///
    /// A write either accepts all of `data` or fails; there are no partial
    /// writes.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Deliver any buffered bytes to the next layer down.
    fn flush(&mut self) -> Result<()>;

    /// Deliver remaining bytes and signal end of stream.
    fn finish(&mut self) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    #[inline]
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    #[inline]
    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    #[inline]
    fn write(&mut self, data: &[u8]) -> Result<()> {
        (**self).write(data)
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    #[inline]
    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
