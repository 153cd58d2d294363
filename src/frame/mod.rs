//! Frame construction, validation and stream framing.
//!
//! A frame carries one chunk of a logical line:
//!
//! ```text
//! final:        STX <n> payload… CR ETX <c1> <c2> CR LF
//! continuation: STX <n> payload…    ETB <c1> <c2> CR LF
//! ```
//!
//! `<n>` is the one-digit frame number and `<c1><c2>` the hexadecimal
//! [`Checksum`] over everything after `STX` up to and including the
//! terminator.

use std::fmt;

pub mod checksum;
pub mod codec;
pub mod error;
pub mod link_codec;

pub use checksum::{Checksum, checksum};
pub use codec::{
    encode_frame,
    extract_payload,
    extract_text,
    terminator_at,
    validate_checksum,
    verify_checksum,
};
pub use error::FrameError;
pub use link_codec::{Inbound, LinkCodec, Outbound};

use crate::control::{ETB, ETX};

/// The byte closing a frame's checked region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terminator {
    /// `ETX`: the frame completes its logical line.
    Final,
    /// `ETB`: more frames of the same line follow.
    Continuation,
}

impl Terminator {
    /// Wire value of the terminator.
    #[must_use]
    pub const fn byte(self) -> u8 {
        match self {
            Self::Final => ETX,
            Self::Continuation => ETB,
        }
    }

    /// Classify a raw byte, if it is a terminator.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ETX => Some(Self::Final),
            ETB => Some(Self::Continuation),
            _ => None,
        }
    }

    /// Whether this terminator ends the logical line.
    #[must_use]
    pub const fn is_final(self) -> bool { matches!(self, Self::Final) }
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Final => "ETX",
            Self::Continuation => "ETB",
        })
    }
}
