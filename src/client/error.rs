//! Error types for link client operations.

use std::{io, time::Duration};

use crate::session::SessionError;

/// Errors emitted by [`LinkClient`](super::LinkClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Establishing the connection failed.
    #[error("failed to connect: {0}")]
    Io(#[from] io::Error),
    /// A transfer cycle failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The peer never opened a reply cycle.
    #[error("no reply within {waited:?}")]
    ReplyTimeout {
        /// The wait that elapsed.
        waited: Duration,
    },
}
