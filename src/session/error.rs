//! Errors that end a transfer cycle.

use std::{io, time::Duration};

use thiserror::Error;

/// Fatal failures of an initiator or responder cycle.
///
/// Each variant moves the session to [`SessionState::Aborted`](super::SessionState::Aborted).
/// Frame-level problems are not represented here: they are answered with
/// `NAK` and never end the cycle on their own.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading from or writing to the byte stream failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The peer closed the stream while a reply was outstanding.
    #[error("connection closed by peer")]
    Closed,

    /// No reply arrived within the configured wait.
    #[error("no reply within {waited:?}")]
    Timeout {
        /// The wait that elapsed.
        waited: Duration,
    },

    /// The peer answered `ENQ` with something other than `ACK`.
    #[error("handshake rejected with byte {received:#04x}")]
    HandshakeRejected {
        /// The byte received instead of `ACK`.
        received: u8,
    },

    /// The peer kept answering `NAK` beyond the retry policy.
    #[error("frame rejected {attempts} times; giving up")]
    RetriesExhausted {
        /// Retransmissions attempted for the rejected frame.
        attempts: u32,
    },

    /// The surrounding task was asked to stop.
    #[error("session cancelled")]
    Cancelled,
}

impl SessionError {
    /// Returns `true` if the error came from the byte stream itself.
    #[must_use]
    pub fn is_transport(&self) -> bool { matches!(self, Self::Transport(_) | Self::Closed) }
}
