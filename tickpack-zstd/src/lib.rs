//! # tickpack Zstandard
//!
//! Streaming Zstandard compression stage for tickpack sink pipelines.
//!
//! [`ZstdSink`] sits between a [`BitWriter`](tickpack_core::BitWriter) and
//! any other [`Sink`](tickpack_core::Sink), compressing bytes as they arrive
//! and forwarding standard Zstandard frames downstream. It is backed by the
//! reference zstd library, so the output is consumable by any off-the-shelf
//! decoder.
//!
//! ## Example
//!
//! ```rust
//! use tickpack_core::{BitReader, BitWriter, VecSink};
//! use tickpack_zstd::ZstdSink;
//!
//! let mut out = VecSink::new();
//! {
//!     let mut compressor = ZstdSink::new(&mut out, 3).unwrap();
//!     let mut writer = BitWriter::new(&mut compressor);
//!     for size in [100u64, 200, 300, 5_000] {
//!         writer.put_var_dec_zeros(size).unwrap();
//!     }
//!     writer.finish().unwrap();
//! }
//!
//! let raw = zstd::stream::decode_all(out.as_bytes()).unwrap();
//! let mut reader = BitReader::new(&raw);
//! assert_eq!(reader.get_var64_dec_zeros().unwrap(), 100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod sink;

pub use config::{CompressionLevel, ZstdConfig};
pub use sink::{OUT_BUFFER_SIZE, ZstdSink};

/// Zstandard magic number (0xFD2FB528 little-endian).
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
