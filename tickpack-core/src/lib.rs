//! # tickpack Core
//!
//! Core components for the tickpack codec.
//!
//! This crate provides the building blocks for compact, lossless encoding of
//! numeric sequences such as prices, sizes and timestamps:
//!
//! - [`traits`]: The [`Sink`] contract every pipeline stage implements
//! - [`sink`]: Memory, fixed-capacity and `io::Write` sinks
//! - [`bitstream`]: Buffered bit writer and slice-backed bit reader
//! - [`varint`]: Zigzag mapping and decimal-zero stripping helpers
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Caller: record schema, delta bookkeeping                │
//! ├─────────────────────────────────────────────────────────┤
//! │ BitWriter (this crate)                                  │
//! │     put / put_var* / align / flush / finish             │
//! ├─────────────────────────────────────────────────────────┤
//! │ Sink chain                                              │
//! │     ZstdSink (tickpack-zstd) -> VecSink / BufferSink /  │
//! │     WriterSink                                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding reads straight from an in-memory slice with [`BitReader`].
//!
//! ## Example
//!
//! ```rust
//! use tickpack_core::{BitReader, BitWriter, VecSink};
//!
//! let mut out = VecSink::new();
//! let mut writer = BitWriter::new(&mut out);
//! writer.put_var_zero(0).unwrap();
//! writer.finish().unwrap();
//! drop(writer);
//!
//! assert_eq!(out.as_bytes(), &[0b0000_0001]);
//! let mut reader = BitReader::new(out.as_bytes());
//! assert_eq!(reader.get_var64_zero().unwrap(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod sink;
pub mod traits;
pub mod varint;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter, WRITE_BUFFER_SIZE};
pub use error::{Result, TickpackError};
pub use sink::{BufferSink, VecSink, WriterSink};
pub use traits::{FlushMode, Sink};
pub use varint::{VarUint, zigzag_decode, zigzag_encode};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bitstream::{BitReader, BitWriter};
    pub use crate::error::{Result, TickpackError};
    pub use crate::sink::{BufferSink, VecSink, WriterSink};
    pub use crate::traits::Sink;
}
