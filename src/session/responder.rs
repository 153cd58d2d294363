//! Receiving side of a transfer cycle.
//!
//! [`Responder::handle`] is a pure state machine over decoded link items;
//! [`Responder::receive`] drives it from a [`Link`] and writes the replies.

use futures::{SinkExt, StreamExt};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::timeout,
};
use tracing::{debug, info, warn};

use super::{Link, SessionError, SessionState, TransferState};
use crate::{
    config::LinkConfig,
    control::{ACK, ENQ, EOT, NAK, control_name, escape},
    frame::{FrameError, Inbound, Outbound, extract_text, terminator_at, verify_checksum},
    metrics::{self, Direction},
    sequence::SequenceCounter,
};

/// What the responder wants done after one inbound item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Control byte to write back, if any.
    pub reply: Option<u8>,
    /// Text of a transfer cycle that just closed with `EOT`.
    pub delivered: Option<String>,
}

impl Reaction {
    const fn reply(byte: u8) -> Self {
        Self {
            reply: Some(byte),
            delivered: None,
        }
    }
}

/// Validates frames, acknowledges them and reassembles the transferred text.
#[derive(Debug)]
pub struct Responder {
    config: LinkConfig,
    expected: SequenceCounter,
    transfer: TransferState,
    state: SessionState,
}

impl Responder {
    /// Create an idle responder.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            expected: SequenceCounter::new(config.modulus()),
            transfer: TransferState::default(),
            state: SessionState::Idle,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState { self.state }

    /// Frame number the next frame must carry.
    #[must_use]
    pub const fn expected_sequence(&self) -> u8 { self.expected.get() }

    /// Lines and partial text gathered so far in the open cycle.
    #[must_use]
    pub const fn transfer(&self) -> &TransferState { &self.transfer }

    /// Apply one decoded item and report the reply to send.
    pub fn handle(&mut self, inbound: Inbound) -> Reaction {
        match inbound {
            Inbound::Control(ENQ) => self.open_cycle(),
            Inbound::Control(EOT) => self.close_cycle(),
            Inbound::Control(byte) => {
                debug!(
                    byte = control_name(byte).unwrap_or("?"),
                    state = %self.state,
                    "ignoring control byte"
                );
                Reaction::default()
            }
            Inbound::Frame(bytes) => self.on_frame(&bytes),
        }
    }

    fn open_cycle(&mut self) -> Reaction {
        if self.state.in_cycle() {
            warn!(
                lines = self.transfer.completed_lines.len(),
                "ENQ inside an open cycle; discarding partial transfer"
            );
        }
        self.state = SessionState::Handshaking;
        self.transfer = TransferState::default();
        self.expected.reset();
        debug!("handshake accepted");
        self.state = SessionState::AwaitingLine;
        Reaction::reply(ACK)
    }

    fn close_cycle(&mut self) -> Reaction {
        if !self.state.in_cycle() {
            debug!(state = %self.state, "ignoring EOT outside a cycle");
            return Reaction::default();
        }
        if !self.transfer.accumulation.is_empty() {
            warn!(
                partial = %self.transfer.accumulation,
                "EOT before the final frame of a line; partial line dropped"
            );
        }
        let lines = self.transfer.completed_lines.len();
        let text = self.transfer.finish();
        self.expected.reset();
        self.state = SessionState::Done;
        info!(lines, "transmission ended");
        Reaction {
            reply: None,
            delivered: Some(text),
        }
    }

    fn on_frame(&mut self, bytes: &[u8]) -> Reaction {
        info!(frame = %escape(bytes), "received frame");
        metrics::inc_frames(Direction::Inbound);
        if !self.state.in_cycle() {
            warn!(state = %self.state, "frame received outside a transfer cycle");
            self.state = SessionState::AwaitingLine;
        }
        match self.accept_frame(bytes) {
            Ok(()) => {
                self.expected.advance();
                Reaction::reply(ACK)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    expected = self.expected.get(),
                    frame = %escape(bytes),
                    "rejecting frame"
                );
                metrics::inc_rejected();
                Reaction::reply(NAK)
            }
        }
    }

    fn accept_frame(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let terminator = terminator_at(bytes)?;
        let received = bytes[1];
        if !self.expected.matches_digit(received) {
            return Err(FrameError::SequenceMismatch {
                expected: self.expected.get(),
                received,
            });
        }
        verify_checksum(bytes, terminator)?;
        let text = extract_text(bytes, terminator)?;
        match self.transfer.accept_chunk(&text, terminator.is_final()) {
            Some(line) => info!(line, "line received"),
            None => debug!(chunk = %text, "continuation frame buffered"),
        }
        Ok(())
    }

    /// Read from `link` until a transfer cycle closes, replying as it goes.
    ///
    /// An idle link waits indefinitely; once `ENQ` opens a cycle every item
    /// must arrive within the configured receive timeout.
    ///
    /// Returns `Ok(None)` if the peer closes the stream between cycles.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the stream fails, closes mid-cycle or
    /// stays silent past the receive timeout. The partial transfer is
    /// discarded.
    pub async fn receive<T>(&mut self, link: &mut Link<T>) -> Result<Option<String>, SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            let next = if self.state.in_cycle() {
                let waited = self.config.receive_wait();
                match timeout(waited, link.next()).await {
                    Ok(next) => next,
                    Err(_) => return Err(self.abort(SessionError::Timeout { waited })),
                }
            } else {
                link.next().await
            };
            let inbound = match next {
                Some(Ok(inbound)) => inbound,
                Some(Err(err)) => return Err(self.abort(err.into())),
                None if self.state.in_cycle() => return Err(self.abort(SessionError::Closed)),
                None => return Ok(None),
            };

            let reaction = self.handle(inbound);
            if let Some(byte) = reaction.reply {
                if let Err(err) = link.send(Outbound::Control(byte)).await {
                    return Err(self.abort(err.into()));
                }
            }
            if let Some(text) = reaction.delivered {
                return Ok(Some(text));
            }
        }
    }

    fn abort(&mut self, err: SessionError) -> SessionError {
        warn!(
            error = %err,
            lines = self.transfer.completed_lines.len(),
            "receive aborted; partial transfer discarded"
        );
        metrics::inc_errors();
        self.transfer = TransferState::default();
        self.expected.reset();
        self.state = SessionState::Aborted;
        err
    }
}
