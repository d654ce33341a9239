//! Streaming Zstandard compressor sink.
//!
//! [`ZstdSink`] decorates a downstream [`Sink`]: bytes written to it are fed
//! through a zstd compression context and the compressed output is forwarded
//! downstream as soon as the staging buffer has any. The output is a standard
//! Zstandard frame that any decoder can read.
//!
//! # Stages
//!
//! - `write`: continue mode, loops until all input is consumed and the last
//!   staging buffer came back partially filled.
//! - `flush`: flush mode, loops until zstd reports nothing pending, then
//!   flushes downstream. The frame stays open but everything written so far
//!   becomes decodable.
//! - `finish`: end mode, loops until the frame epilogue is fully emitted,
//!   then finishes downstream.
//!
//! Any failure poisons the sink; later calls return
//! [`TickpackError::StreamClosed`].

use crate::config::{CompressionLevel, ZstdConfig};
use std::fmt;
use tickpack_core::error::{Result, TickpackError};
use tickpack_core::traits::{FlushMode, Sink};
use zstd::stream::raw::{CParameter, Encoder, InBuffer, Operation, OutBuffer};

/// Size of the compressed-output staging buffer.
pub const OUT_BUFFER_SIZE: usize = 128 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Open,
    Finished,
    Failed,
}

/// A [`Sink`] that zstd-compresses everything written to it.
///
/// The downstream sink is borrowed for the lifetime of the decorator and
/// must not be written to by anyone else meanwhile. The compression context
/// is owned and released on drop; dropping without [`finish`](Sink::finish)
/// leaves the frame incomplete.
pub struct ZstdSink<'a, S: Sink + ?Sized> {
    down: &'a mut S,
    encoder: Encoder<'static>,
    out_buf: Box<[u8]>,
    config: ZstdConfig,
    state: StreamState,
    total_in: u64,
    total_out: u64,
}

impl<'a, S: Sink + ?Sized> ZstdSink<'a, S> {
    /// Create a compressor at `level` in front of `down`.
    pub fn new(down: &'a mut S, level: impl Into<CompressionLevel>) -> Result<Self> {
        Self::with_config(down, ZstdConfig::new().with_level(level))
    }

    /// Create a compressor with explicit settings in front of `down`.
    pub fn with_config(down: &'a mut S, config: ZstdConfig) -> Result<Self> {
        let mut encoder = Encoder::new(config.level.level()).map_err(codec_error)?;
        encoder
            .set_parameter(CParameter::ChecksumFlag(config.checksum))
            .map_err(codec_error)?;
        if let Some(size) = config.pledged_size {
            encoder
                .set_pledged_src_size(Some(size))
                .map_err(codec_error)?;
        }

        log::debug!(
            "zstd sink created (level {}, checksum {})",
            config.level.level(),
            config.checksum
        );

        Ok(Self {
            down,
            encoder,
            out_buf: vec![0u8; OUT_BUFFER_SIZE].into_boxed_slice(),
            config,
            state: StreamState::Open,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Settings this sink was created with.
    pub fn config(&self) -> &ZstdConfig {
        &self.config
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes forwarded downstream so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Whether the frame has been closed by a successful `finish`.
    pub fn is_finished(&self) -> bool {
        self.state == StreamState::Finished
    }

    /// Run `op` on an open stream, poisoning it if `op` fails.
    fn guarded(&mut self, op: impl FnOnce(&mut Self) -> Result<()>) -> Result<()> {
        if self.state != StreamState::Open {
            return Err(TickpackError::StreamClosed);
        }
        let result = op(self);
        if let Err(err) = &result {
            log::warn!("zstd sink failed, stream abandoned: {err}");
            self.state = StreamState::Failed;
        }
        result
    }

    /// Drive the compression context in `mode` until it has nothing left to
    /// emit for that mode, forwarding every staged chunk downstream.
    fn drive(&mut self, data: &[u8], mode: FlushMode) -> Result<()> {
        let mut input = InBuffer::around(data);
        loop {
            let mut output = OutBuffer::around(&mut self.out_buf[..]);
            let pending = match mode {
                FlushMode::Continue => self.encoder.run(&mut input, &mut output),
                FlushMode::Flush => self.encoder.flush(&mut output),
                FlushMode::End => self.encoder.finish(&mut output, true),
            }
            .map_err(codec_error)?;
            let produced = output.pos();

            if produced > 0 {
                self.down.write(&self.out_buf[..produced])?;
                self.total_out += produced as u64;
            }

            let done = match mode {
                // A full staging buffer may hide more output.
                FlushMode::Continue => input.pos == data.len() && produced < self.out_buf.len(),
                FlushMode::Flush | FlushMode::End => pending == 0,
            };
            if done {
                return Ok(());
            }
        }
    }
}

impl<S: Sink + ?Sized> Sink for ZstdSink<'_, S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.guarded(|this| {
            this.drive(data, FlushMode::Continue)?;
            this.total_in += data.len() as u64;
            Ok(())
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.guarded(|this| {
            this.drive(&[], FlushMode::Flush)?;
            this.down.flush()
        })?;
        log::debug!(
            "zstd sink flushed: {} bytes in, {} bytes out",
            self.total_in,
            self.total_out
        );
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.guarded(|this| {
            this.drive(&[], FlushMode::End)?;
            this.down.finish()
        })?;
        self.state = StreamState::Finished;
        log::debug!(
            "zstd sink finished: {} bytes in, {} bytes out",
            self.total_in,
            self.total_out
        );
        Ok(())
    }
}

impl<S: Sink + ?Sized> fmt::Debug for ZstdSink<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZstdSink")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("total_in", &self.total_in)
            .field("total_out", &self.total_out)
            .finish_non_exhaustive()
    }
}

fn codec_error(err: std::io::Error) -> TickpackError {
    TickpackError::compression(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZSTD_MAGIC;
    use tickpack_core::sink::{BufferSink, VecSink};

    #[test]
    fn test_round_trip_small() {
        let data = b"bid 100.50 x 300, ask 100.55 x 200, bid 100.50 x 300, ask 100.55 x 200";
        let mut out = VecSink::new();
        {
            let mut sink = ZstdSink::new(&mut out, 3).unwrap();
            sink.write(data).unwrap();
            sink.finish().unwrap();
            assert!(sink.is_finished());
            assert_eq!(sink.total_in(), data.len() as u64);
        }
        assert_eq!(&out.as_bytes()[..4], &ZSTD_MAGIC);
        let decoded = zstd::stream::decode_all(out.as_bytes()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_empty_stream_is_valid_frame() {
        let mut out = VecSink::new();
        let mut sink = ZstdSink::new(&mut out, CompressionLevel::FAST).unwrap();
        sink.finish().unwrap();
        let total_out = sink.total_out();
        drop(sink);

        assert_eq!(total_out, out.len() as u64);
        assert!(!out.is_empty());
        assert!(zstd::stream::decode_all(out.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_write_after_finish_is_rejected() {
        let mut out = VecSink::new();
        let mut sink = ZstdSink::new(&mut out, 3).unwrap();
        sink.write(b"abc").unwrap();
        sink.finish().unwrap();
        assert!(matches!(sink.write(b"d"), Err(TickpackError::StreamClosed)));
        assert!(matches!(sink.flush(), Err(TickpackError::StreamClosed)));
        assert!(matches!(sink.finish(), Err(TickpackError::StreamClosed)));
    }

    #[test]
    fn test_downstream_failure_poisons_stream() {
        let mut storage = [0u8; 4];
        let mut down = BufferSink::new(&mut storage);
        let mut sink = ZstdSink::new(&mut down, 3).unwrap();
        let err = sink
            .write(&[7u8; 1024])
            .and_then(|_| sink.finish())
            .unwrap_err();
        assert!(matches!(err, TickpackError::CapacityExceeded { .. }));
        assert!(!sink.is_finished());
        assert!(matches!(sink.write(b"x"), Err(TickpackError::StreamClosed)));
    }

    #[test]
    fn test_pledged_size_mismatch_poisons_stream() {
        let mut out = VecSink::new();
        let config = ZstdConfig::new().with_pledged_size(4);
        let mut sink = ZstdSink::with_config(&mut out, config).unwrap();
        let err = sink
            .write(&[9u8; 64])
            .and_then(|_| sink.finish())
            .unwrap_err();
        assert!(matches!(err, TickpackError::Compression { .. }));
        assert!(!sink.is_finished());
        assert!(matches!(sink.write(b"x"), Err(TickpackError::StreamClosed)));
        assert!(matches!(sink.finish(), Err(TickpackError::StreamClosed)));
    }

    #[test]
    fn test_pledged_size_in_frame_header() {
        let data = [5u8; 300];
        for pledged in [None, Some(data.len() as u64)] {
            let mut out = VecSink::new();
            let mut config = ZstdConfig::new();
            config.pledged_size = pledged;
            let mut sink = ZstdSink::with_config(&mut out, config).unwrap();
            sink.write(&data).unwrap();
            sink.finish().unwrap();
            drop(sink);

            // Single_Segment_flag and Frame_Content_Size_flag live in bits 5..8.
            let descriptor = out.as_bytes()[4];
            assert_eq!(descriptor & 0xE0 != 0, pledged.is_some());
            let decoded = zstd::stream::decode_all(out.as_bytes()).unwrap();
            assert_eq!(decoded, data);
        }
    }

    #[test]
    fn test_checksum_flag_in_frame_header() {
        for checksum in [false, true] {
            let mut out = VecSink::new();
            let config = ZstdConfig::new().with_checksum(checksum);
            let mut sink = ZstdSink::with_config(&mut out, config).unwrap();
            sink.write(b"checksummed payload").unwrap();
            sink.finish().unwrap();
            drop(sink);

            // Frame_Header_Descriptor bit 2 is Content_Checksum_flag.
            let descriptor = out.as_bytes()[4];
            assert_eq!(descriptor & 0x04 != 0, checksum);
            let decoded = zstd::stream::decode_all(out.as_bytes()).unwrap();
            assert_eq!(decoded, b"checksummed payload");
        }
    }
}
