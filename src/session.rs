//! Transfer sessions: the two roles of the half-duplex link.
//!
//! An [`Initiator`] opens a cycle with `ENQ`, sends every chunk of its text
//! as a numbered frame, retransmits on `NAK` and closes with `EOT`. A
//! [`Responder`] acknowledges `ENQ`, validates each frame, reassembles
//! continuation frames into logical lines and hands the joined text back on
//! `EOT`.
//!
//! Both roles drive a [`Link`]: the connection's byte stream framed with
//! [`LinkCodec`]. A connection switches roles by handing the same link to
//! the other type; only one side transmits frames at a time.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::{config::LinkConfig, frame::LinkCodec};

pub mod error;
pub mod initiator;
pub mod responder;
pub mod retry;
pub mod state;

pub use error::SessionError;
pub use initiator::{Initiator, TransmitReport};
pub use responder::{Reaction, Responder};
pub use retry::RetryPolicy;
pub use state::{SessionState, TransferState};

/// A byte stream framed for the link protocol.
pub type Link<T> = Framed<T, LinkCodec>;

/// Wrap `io` in a [`Link`] sized for `config`.
pub fn link<T>(io: T, config: &LinkConfig) -> Link<T>
where
    T: AsyncRead + AsyncWrite,
{
    Framed::new(io, LinkCodec::new(config.max_frame_length()))
}
