//! Stream framing for the half-duplex link.
//!
//! [`LinkCodec`] splits the raw byte stream into handshake bytes and
//! LF-terminated frames, and writes either kind back out. It performs no
//! validation: deciding whether a frame deserves `ACK` or `NAK` is the
//! responder's job.

use std::io;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::control::{LF, escape, is_handshake};

/// Default cap on buffered bytes before a pending frame is flushed as-is.
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 1024;

/// One unit read from the link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    /// A single byte outside any frame (handshakes and stray bytes).
    Control(u8),
    /// Raw bytes of one frame, through its closing LF.
    Frame(Bytes),
}

/// One unit written to the link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// A single handshake byte.
    Control(u8),
    /// A fully encoded frame.
    Frame(Bytes),
}

/// Tokio codec for the link byte stream.
///
/// `ENQ`, `ACK`, `NAK` and `EOT` are always delivered as
/// [`Inbound::Control`]; if one interrupts a partially received frame, the
/// partial bytes are dropped. Every other byte accumulates into the pending
/// frame until LF. A pending frame longer than `max_frame_length` is yielded
/// unterminated so the receiver can reject it.
#[derive(Clone, Debug)]
pub struct LinkCodec {
    max_frame_length: usize,
}

impl LinkCodec {
    /// Create a codec with the given pending-frame cap.
    #[must_use]
    pub fn new(max_frame_length: usize) -> Self {
        Self {
            max_frame_length: max_frame_length.max(1),
        }
    }

    /// Return the pending-frame cap.
    #[must_use]
    pub const fn max_frame_length(&self) -> usize { self.max_frame_length }
}

impl Default for LinkCodec {
    fn default() -> Self { Self::new(DEFAULT_MAX_FRAME_LENGTH) }
}

impl Decoder for LinkCodec {
    type Item = Inbound;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(at) = src.iter().position(|&b| is_handshake(b) || b == LF) else {
            if src.len() > self.max_frame_length {
                let overrun = src.split().freeze();
                tracing::debug!(len = overrun.len(), "pending frame overran the length cap");
                return Ok(Some(Inbound::Frame(overrun)));
            }
            return Ok(None);
        };

        if src[at] == LF {
            return Ok(Some(Inbound::Frame(src.split_to(at + 1).freeze())));
        }

        if at > 0 {
            let partial = src.split_to(at);
            tracing::warn!(
                discarded = %escape(&partial),
                "handshake byte interrupted a partial frame"
            );
        }
        let byte = src.get_u8();
        Ok(Some(Inbound::Control(byte)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None if src.is_empty() => Ok(None),
            None => {
                let partial = src.split();
                tracing::debug!(
                    discarded = %escape(&partial),
                    "connection closed mid-frame"
                );
                Ok(None)
            }
        }
    }
}

impl Encoder<Outbound> for LinkCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Outbound, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Outbound::Control(byte) => dst.extend_from_slice(&[byte]),
            Outbound::Frame(frame) => dst.extend_from_slice(&frame),
        }
        Ok(())
    }
}
