//! Wire-level parsing errors.

use thiserror::Error;

/// Errors produced while decoding frames or packets off the wire.
///
/// Every variant here corresponds to a condition that must never panic:
/// the decoder always returns one of these instead of indexing past a
/// buffer or trusting an attacker-controlled length.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes were available than the fixed header requires.
    #[error("frame header too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum bytes required.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The header declared a payload length above the hard ceiling.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Declared payload size.
        size: usize,
        /// Configured ceiling.
        max: usize,
    },

    /// The buffer ended before `length` payload bytes were present.
    #[error("truncated frame: header declared {declared} payload bytes, only {available} present")]
    TruncatedFrame {
        /// Bytes declared by the header.
        declared: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// A length-prefixed or count-prefixed field would read past the
    /// frame boundary, or a `count * record_size` multiplication would
    /// overflow.
    #[error("field at offset {offset} with size {size} overruns frame of length {frame_len}")]
    OutOfBounds {
        /// Offset the read would start at.
        offset: usize,
        /// Size of the read.
        size: usize,
        /// Total frame length.
        frame_len: usize,
    },

    /// A string field was expected to be NUL-terminated but wasn't.
    #[error("expected NUL terminator not found")]
    MissingTerminator,

    /// The packet payload is otherwise structurally invalid for its
    /// declared type (wrong fixed-header size, inconsistent offsets).
    #[error("malformed packet: {0}")]
    Malformed(String),
}

/// Convenience alias used throughout the wire-format layer.
pub type Result<T> = std::result::Result<T, ProtocolError>;
