//! Errors raised while building or validating a single wire frame.
//!
//! Every variant is recoverable: a receiver answers `NAK`, discards the
//! buffered bytes and waits for the sender to retransmit.

use thiserror::Error;

use super::{Checksum, Terminator};

/// Structural, checksum and numbering failures for one frame.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// No `STX` marker where one is required.
    #[error("frame does not start with STX")]
    MissingStart,

    /// The requested terminator byte does not occur in the frame.
    #[error("frame has no {0} terminator")]
    MissingTerminator(Terminator),

    /// The terminator occurs at or before the start marker.
    #[error("terminator precedes start marker")]
    TerminatorBeforeStart,

    /// Fewer bytes than the smallest legal frame of this kind.
    #[error("frame too short: {len} bytes, need at least {min}")]
    TooShort {
        /// Received frame length.
        len: usize,
        /// Minimum length for the expected terminator.
        min: usize,
    },

    /// The byte at the terminator offset is not a known terminator.
    #[error("no ETX or ETB at terminator offset (found {found:#04x})")]
    UnknownTerminator {
        /// Byte found at the terminator offset.
        found: u8,
    },

    /// The terminator offset holds the other terminator variant.
    #[error("expected {expected} terminator, found {found}")]
    UnexpectedTerminator {
        /// Terminator the caller expected.
        expected: Terminator,
        /// Terminator actually present.
        found: Terminator,
    },

    /// A final frame lacks the CR immediately before `ETX`.
    #[error("final frame lacks CR before ETX")]
    MissingFieldSeparator,

    /// The frame does not end with CR LF.
    #[error("frame trailer is not CR LF")]
    BadTrailer,

    /// Transmitted checksum differs from the computed one.
    #[error("checksum mismatch: computed {computed}, received {received}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes.
        computed: Checksum,
        /// The two characters carried by the frame.
        received: String,
    },

    /// Frame number differs from the one the receiver expects.
    #[error("sequence mismatch: expected {expected}, received {received:#04x}")]
    SequenceMismatch {
        /// Expected frame number.
        expected: u8,
        /// Raw byte found at the frame-number position.
        received: u8,
    },
}

impl FrameError {
    /// Returns `true` for structural violations (missing markers, wrong
    /// length, misplaced terminator).
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(
            self,
            Self::ChecksumMismatch { .. } | Self::SequenceMismatch { .. }
        )
    }

    /// Short category label used in logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChecksumMismatch { .. } => "checksum",
            Self::SequenceMismatch { .. } => "sequence",
            _ => "malformed",
        }
    }
}
