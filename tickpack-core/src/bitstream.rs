//! Bit-level I/O with the varint families used for market-data streams.
//!
//! This module provides [`BitWriter`], which packs sub-byte fields into a
//! fixed 64 KiB buffer and spills it into a [`Sink`], and [`BitReader`], its
//! dual over an in-memory byte slice.
//!
//! # Bit Ordering
//!
//! Fields are packed LSB-first: the first bit written lands in bit 0 of the
//! first output byte, and each field continues from where the previous one
//! stopped.
//!
//! # Example
//!
//! ```
//! use tickpack_core::bitstream::{BitReader, BitWriter};
//! use tickpack_core::sink::VecSink;
//!
//! let mut out = VecSink::new();
//! {
//!     let mut writer = BitWriter::new(&mut out);
//!     writer.put(0b101, 3).unwrap();
//!     writer.put_var_dec_zeros(1500).unwrap();
//!     writer.put_var_sign_zero(-3).unwrap();
//!     writer.finish().unwrap();
//! }
//!
//! let mut reader = BitReader::new(out.as_bytes());
//! assert_eq!(reader.get(3).unwrap(), 0b101);
//! assert_eq!(reader.get_var64_dec_zeros().unwrap(), 1500);
//! assert_eq!(reader.get_var64_sign_zero().unwrap(), -3);
//! ```

use crate::error::{Result, TickpackError};
use crate::traits::Sink;
use crate::varint::{
    CONTINUATION_FLAG, PAYLOAD_MASK, POW10, VarUint, strip_decimal_zeros,
    strip_decimal_zeros_signed, zigzag_decode, zigzag_encode,
};
use std::fmt;

/// Size of the writer's internal byte buffer.
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Width of the stripped decimal-zero count.
const DEC_ZEROS_BITS: u32 = 4;

#[inline(always)]
fn low_mask(width: u32) -> u64 {
    u64::MAX >> (64 - width)
}

/// A buffered bit-level writer that spills into a [`Sink`].
///
/// Complete bytes are emitted eagerly, so at most 7 bits are pending after
/// any call succeeds. Bytes collect in a fixed buffer allocated once at
/// construction and reach the sink when a full buffer has to take another
/// byte, on [`flush`], or on [`finish`].
///
/// Dropping a writer does not flush it; call [`finish`] to end the stream.
///
/// If the sink rejects a buffer, the bytes it held stay buffered and every
/// later call retries the spill first, returning the sink's error until it
/// succeeds.
///
/// [`flush`]: BitWriter::flush
/// [`finish`]: BitWriter::finish
pub struct BitWriter<S: Sink> {
    /// Destination of completed buffers.
    sink: S,
    /// Completed bytes not yet handed to the sink.
    buf: Box<[u8]>,
    /// Number of valid bytes in `buf`.
    pos: usize,
    /// Bytes already handed to the sink.
    flushed: u64,
    /// Pending bits (LSB-first). Wide enough to take a 64-bit field on top
    /// of 7 pending bits, or of 64 bits left over by a failed spill.
    acc: u128,
    /// Number of valid bits in `acc`.
    bits: u32,
}

impl<S: Sink> BitWriter<S> {
    /// Create a new `BitWriter` with a [`WRITE_BUFFER_SIZE`] buffer.
    pub fn new(sink: S) -> Self {
        Self::with_capacity(sink, WRITE_BUFFER_SIZE)
    }

    /// Create a new `BitWriter` whose buffer spills every `capacity` bytes.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(sink: S, capacity: usize) -> Self {
        Self {
            sink,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            flushed: 0,
            acc: 0,
            bits: 0,
        }
    }

    /// Get a reference to the underlying sink.
    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume this `BitWriter` and return the underlying sink.
    ///
    /// Buffered bytes and pending bits are discarded; call
    /// [`finish`](Self::finish) first to keep them.
    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Total bits accepted so far, whether or not they reached the sink.
    pub fn bits_written(&self) -> u64 {
        ((self.flushed + self.pos as u64) << 3) + u64::from(self.bits)
    }

    /// Bits not yet moved into the byte buffer.
    ///
    /// Below 8 unless a spill into the sink has failed.
    pub fn pending_bits(&self) -> u32 {
        self.bits
    }

    /// Append the low `width` bits of `value`.
    ///
    /// `width` ranges over 0..=64; a width of 0 writes nothing.
    #[inline]
    pub fn put(&mut self, value: u64, width: u32) -> Result<()> {
        debug_assert!(width <= 64, "Cannot write more than 64 bits at once");

        if width == 0 {
            return Ok(());
        }
        let width = width.min(64);

        self.drain()?;
        self.acc |= u128::from(value & low_mask(width)) << self.bits;
        self.bits += width;
        self.drain()
    }

    /// Move every complete byte from the accumulator into the buffer.
    #[inline(always)]
    fn drain(&mut self) -> Result<()> {
        while self.bits >= 8 {
            self.write_byte(self.acc as u8)?;
            self.acc >>= 8;
            self.bits -= 8;
        }
        Ok(())
    }

    #[inline(always)]
    fn put_flag(&mut self, set: bool) -> Result<()> {
        self.put(u64::from(set), 1)
    }

    /// Pad with zero bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) -> Result<()> {
        self.drain()?;
        if self.bits > 0 {
            self.write_byte(self.acc as u8)?;
            self.acc = 0;
            self.bits = 0;
        }
        Ok(())
    }

    /// Hand buffered bytes to the sink and flush it.
    ///
    /// Pending bits stay pending; the stream is not aligned.
    pub fn flush(&mut self) -> Result<()> {
        self.drain()?;
        self.spill()?;
        self.sink.flush()
    }

    /// Align, hand buffered bytes to the sink and finish it.
    ///
    /// No further writes are valid afterwards.
    pub fn finish(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.spill()?;
        self.sink.finish()
    }

    /// Write a base-128 varint.
    ///
    /// Only `u8`, `u16`, `u32` and `u64` are accepted.
    pub fn put_var<T: VarUint>(&mut self, value: T) -> Result<()> {
        let mut v = value.to_u64();
        while v >= u64::from(CONTINUATION_FLAG) {
            self.put((v & u64::from(PAYLOAD_MASK)) | u64::from(CONTINUATION_FLAG), 8)?;
            v >>= 7;
        }
        self.put(v, 8)
    }

    /// Write a zero flag, followed by a varint if `value` is nonzero.
    pub fn put_var_zero(&mut self, value: u64) -> Result<()> {
        self.put_flag(value == 0)?;
        if value == 0 {
            return Ok(());
        }
        self.put_var(value)
    }

    /// Write a zero flag, followed by the zigzag varint of a nonzero `value`.
    pub fn put_var_sign_zero(&mut self, value: i64) -> Result<()> {
        self.put_flag(value == 0)?;
        if value == 0 {
            return Ok(());
        }
        self.put_var(zigzag_encode(value))
    }

    /// Write a zero flag; for nonzero `value`, the 4-bit count of stripped
    /// trailing decimal zeros followed by the varint of the residual.
    pub fn put_var_dec_zeros(&mut self, value: u64) -> Result<()> {
        self.put_flag(value == 0)?;
        if value == 0 {
            return Ok(());
        }
        let (reduced, k) = strip_decimal_zeros(value);
        self.put(u64::from(k), DEC_ZEROS_BITS)?;
        self.put_var(reduced)
    }

    /// Signed counterpart of [`put_var_dec_zeros`](Self::put_var_dec_zeros).
    ///
    /// Zeros are stripped from the signed value; the residual is zigzag
    /// mapped.
    pub fn put_var_sign_dec_zeros(&mut self, value: i64) -> Result<()> {
        self.put_flag(value == 0)?;
        if value == 0 {
            return Ok(());
        }
        let (reduced, k) = strip_decimal_zeros_signed(value);
        self.put(u64::from(k), DEC_ZEROS_BITS)?;
        self.put_var(zigzag_encode(reduced))
    }

    /// Write `value - base` as a varint and return `value`.
    ///
    /// Fails with [`TickpackError::BaseAboveValue`] when `value < base`.
    pub fn put_var_base(&mut self, value: u64, base: u64) -> Result<u64> {
        self.put_var(checked_delta(value, base)?)?;
        Ok(value)
    }

    /// Write `value - base` with [`put_var_zero`](Self::put_var_zero) and
    /// return `value`.
    pub fn put_var_zero_base(&mut self, value: u64, base: u64) -> Result<u64> {
        self.put_var_zero(checked_delta(value, base)?)?;
        Ok(value)
    }

    /// Write `value - base` with
    /// [`put_var_dec_zeros`](Self::put_var_dec_zeros) and return `value`.
    pub fn put_var_dec_zeros_base(&mut self, value: u64, base: u64) -> Result<u64> {
        self.put_var_dec_zeros(checked_delta(value, base)?)?;
        Ok(value)
    }

    /// Write the signed delta `value - base` with
    /// [`put_var_sign_zero`](Self::put_var_sign_zero) and return `value`.
    ///
    /// The delta wraps on overflow, matching the reader's wrapping add.
    pub fn put_var_sign_zero_base(&mut self, value: i64, base: i64) -> Result<i64> {
        self.put_var_sign_zero(value.wrapping_sub(base))?;
        Ok(value)
    }

    /// Write the difference of two unsigned values as a signed delta with
    /// [`put_var_sign_dec_zeros`](Self::put_var_sign_dec_zeros) and return
    /// `value`.
    ///
    /// `value` may be below `base`; the delta is the two's complement
    /// difference.
    pub fn put_var_sign_dec_zeros_base(&mut self, value: u64, base: u64) -> Result<u64> {
        self.put_var_sign_dec_zeros(value.wrapping_sub(base) as i64)?;
        Ok(value)
    }

    #[inline(always)]
    fn write_byte(&mut self, byte: u8) -> Result<()> {
        // A byte is only taken once there is room for it, so a failed spill
        // leaves the accumulator holding it.
        if self.pos == self.buf.len() {
            self.spill()?;
        }
        self.buf[self.pos] = byte;
        self.pos += 1;
        Ok(())
    }

    fn spill(&mut self) -> Result<()> {
        if self.pos == 0 {
            return Ok(());
        }
        self.sink.write(&self.buf[..self.pos])?;
        self.flushed += self.pos as u64;
        log::trace!(
            "bit writer spilled {} bytes ({} total)",
            self.pos,
            self.flushed
        );
        self.pos = 0;
        Ok(())
    }
}

impl<S: Sink> fmt::Debug for BitWriter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitWriter")
            .field("capacity", &self.buf.len())
            .field("buffered", &self.pos)
            .field("flushed", &self.flushed)
            .field("pending_bits", &self.bits)
            .finish()
    }
}

#[inline]
fn checked_delta(value: u64, base: u64) -> Result<u64> {
    value
        .checked_sub(base)
        .ok_or_else(|| TickpackError::base_above_value(value, base))
}

/// A bit-level reader over an in-memory byte slice.
///
/// Bytes are pulled lazily, only as many as a request needs, so up to 7
/// bits of a partially consumed byte may stay buffered between calls.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source bytes.
    data: &'a [u8],
    /// Index of the next unread byte in `data`.
    pos: usize,
    /// Buffered bits (LSB-first).
    acc: u128,
    /// Number of valid bits in `acc`.
    bits: u32,
}

impl<'a> BitReader<'a> {
    /// Create a new `BitReader` over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            acc: 0,
            bits: 0,
        }
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        ((self.pos as u64) << 3) - u64::from(self.bits)
    }

    /// Number of bits not yet consumed.
    pub fn remaining_bits(&self) -> u64 {
        (((self.data.len() - self.pos) as u64) << 3) + u64::from(self.bits)
    }

    /// Read `width` bits (0..=64), first bit in the LSB position.
    #[inline]
    pub fn get(&mut self, width: u32) -> Result<u64> {
        debug_assert!(width <= 64, "Cannot read more than 64 bits at once");

        if width == 0 {
            return Ok(0);
        }
        let width = width.min(64);

        while self.bits < width {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(TickpackError::underflow(self.bit_position(), width));
            };
            self.acc |= u128::from(byte) << self.bits;
            self.pos += 1;
            self.bits += 8;
        }

        let value = (self.acc as u64) & low_mask(width);
        self.acc >>= width;
        self.bits -= width;
        Ok(value)
    }

    #[inline(always)]
    fn get_flag(&mut self) -> Result<bool> {
        Ok(self.get(1)? != 0)
    }

    /// Discard bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let remainder = self.bits % 8;
        self.acc >>= remainder;
        self.bits -= remainder;
    }

    /// Read a base-128 varint.
    ///
    /// Fails with [`TickpackError::MalformedVarint`] when the continuation
    /// runs past 64 bits of payload.
    pub fn get_var64(&mut self) -> Result<u64> {
        let start = self.bit_position();
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.get(8)? as u8;
            value |= u64::from(byte & PAYLOAD_MASK) << shift;
            if byte & CONTINUATION_FLAG == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= 64 {
                return Err(TickpackError::malformed_varint(start));
            }
        }
    }

    /// Read a value written by [`BitWriter::put_var_zero`].
    pub fn get_var64_zero(&mut self) -> Result<u64> {
        if self.get_flag()? {
            return Ok(0);
        }
        self.get_var64()
    }

    /// Read a value written by [`BitWriter::put_var_sign_zero`].
    pub fn get_var64_sign_zero(&mut self) -> Result<i64> {
        if self.get_flag()? {
            return Ok(0);
        }
        Ok(zigzag_decode(self.get_var64()?))
    }

    /// Read a value written by [`BitWriter::put_var_dec_zeros`].
    pub fn get_var64_dec_zeros(&mut self) -> Result<u64> {
        if self.get_flag()? {
            return Ok(0);
        }
        let k = self.get(DEC_ZEROS_BITS)? as usize;
        let reduced = self.get_var64()?;
        reduced
            .checked_mul(POW10[k])
            .ok_or_else(|| TickpackError::value_overflow(self.bit_position()))
    }

    /// Read a value written by [`BitWriter::put_var_sign_dec_zeros`].
    pub fn get_var64_sign_dec_zeros(&mut self) -> Result<i64> {
        if self.get_flag()? {
            return Ok(0);
        }
        let k = self.get(DEC_ZEROS_BITS)? as usize;
        let reduced = zigzag_decode(self.get_var64()?);
        reduced
            .checked_mul(POW10[k] as i64)
            .ok_or_else(|| TickpackError::value_overflow(self.bit_position()))
    }
}
