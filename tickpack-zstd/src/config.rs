//! Compressor sink configuration.

/// Zstandard compression level.
///
/// Levels outside the range supported by the linked zstd are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    /// Fastest regular level.
    pub const FAST: Self = Self(1);
    /// Default level, matching zstd's own default.
    pub const DEFAULT: Self = Self(zstd::DEFAULT_COMPRESSION_LEVEL);

    /// Create a level, clamped to the supported range.
    pub fn new(level: i32) -> Self {
        let range = zstd::compression_level_range();
        Self(level.clamp(*range.start(), *range.end()))
    }

    /// Strongest level supported by the linked zstd.
    pub fn best() -> Self {
        Self(*zstd::compression_level_range().end())
    }

    /// Get the level value.
    pub fn level(&self) -> i32 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<i32> for CompressionLevel {
    fn from(level: i32) -> Self {
        Self::new(level)
    }
}

/// Settings applied to a [`ZstdSink`](crate::ZstdSink) at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZstdConfig {
    /// Compression level.
    pub level: CompressionLevel,
    /// Append the standard XXH64 content checksum to the frame.
    pub checksum: bool,
    /// Exact number of bytes that will be written, recorded in the frame
    /// header. Finishing after any other amount is a codec failure.
    pub pledged_size: Option<u64>,
}

impl ZstdConfig {
    /// Default settings: level 3, no checksum, unknown content size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: impl Into<CompressionLevel>) -> Self {
        self.level = level.into();
        self
    }

    /// Set whether the frame carries a content checksum.
    pub fn with_checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    /// Promise that exactly `size` bytes will be written.
    pub fn with_pledged_size(mut self, size: u64) -> Self {
        self.pledged_size = Some(size);
        self
    }
}
