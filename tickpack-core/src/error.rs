//! Error types for tickpack operations.
//!
//! Every failure in the codec is local and synchronous: it is raised at the
//! point of detection and never retried internally. A stream that has
//! produced an error must be abandoned by the caller.

use std::io;
use thiserror::Error;

/// The main error type for tickpack operations.
#[derive(Debug, Error)]
pub enum TickpackError {
    /// I/O error from an underlying output stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A fixed-capacity sink was asked to accept more bytes than it can hold.
    #[error("Sink capacity exceeded: need {requested} bytes, capacity is {capacity}")]
    CapacityExceeded {
        /// Total capacity of the sink.
        capacity: usize,
        /// Total bytes the sink would have held after the write.
        requested: usize,
    },

    /// The streaming compression codec reported an error.
    #[error("Compression codec failure: {message}")]
    Compression {
        /// Codec error description.
        message: String,
    },

    /// A stream was used after it finished or failed.
    #[error("Stream is closed and cannot accept further operations")]
    StreamClosed,

    /// The reader ran out of input before the requested bits were available.
    #[error("Bitstream underflow at bit position {bit_position}: requested {requested} bits")]
    BitstreamUnderflow {
        /// Bit position of the failed read.
        bit_position: u64,
        /// Number of bits requested.
        requested: u32,
    },

    /// A varint did not terminate within 64 bits of payload.
    #[error("Malformed varint at bit position {bit_position}")]
    MalformedVarint {
        /// Bit position where the varint started.
        bit_position: u64,
    },

    /// A decimal-stripped value overflowed 64 bits when restored.
    #[error("Decoded value overflows 64 bits at bit position {bit_position}")]
    ValueOverflow {
        /// Bit position just past the offending value.
        bit_position: u64,
    },

    /// An unsigned base-relative encode was given a value below its base.
    #[error("Value {value} is below base {base}")]
    BaseAboveValue {
        /// Value passed to the encoder.
        value: u64,
        /// Baseline the value was encoded against.
        base: u64,
    },
}

/// Result type alias for tickpack operations.
pub type Result<T> = std::result::Result<T, TickpackError>;

impl TickpackError {
    /// Create a capacity exceeded error.
    pub fn capacity_exceeded(capacity: usize, requested: usize) -> Self {
        Self::CapacityExceeded {
            capacity,
            requested,
        }
    }

    /// Create a compression codec error.
    pub fn compression(message: impl Into<String>) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Create a bitstream underflow error.
    pub fn underflow(bit_position: u64, requested: u32) -> Self {
        Self::BitstreamUnderflow {
            bit_position,
            requested,
        }
    }

    /// Create a malformed varint error.
    pub fn malformed_varint(bit_position: u64) -> Self {
        Self::MalformedVarint { bit_position }
    }

    /// Create a value overflow error.
    pub fn value_overflow(bit_position: u64) -> Self {
        Self::ValueOverflow { bit_position }
    }

    /// Create a base above value error.
    pub fn base_above_value(value: u64, base: u64) -> Self {
        Self::BaseAboveValue { value, base }
    }
}
