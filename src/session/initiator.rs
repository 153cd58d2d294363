//! Sending side of a transfer cycle.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    time::{sleep, timeout},
};
use tracing::{debug, info, warn};

use super::{Link, RetryPolicy, SessionError, SessionState};
use crate::{
    config::LinkConfig,
    control::{ACK, ENQ, EOT, NAK, escape, to_latin1},
    frame::{Inbound, Outbound, encode_frame, validate_checksum},
    metrics::{self, Direction},
    partition::{Chunk, Partitioner},
    sequence::SequenceCounter,
    simulation::FaultInjector,
};

/// Summary of a completed initiator cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransmitReport {
    /// Logical lines sent.
    pub lines: usize,
    /// Frames written, retransmissions included.
    pub frames_sent: usize,
    /// Frames written again after `NAK`.
    pub retransmissions: usize,
}

enum Reply {
    Ack,
    Nak,
}

/// Drives one side of the link through `ENQ`, frames and `EOT`.
///
/// The initiator owns its frame counter and partition cursor; a fresh
/// cycle starts from frame number 1 every time [`transmit`](Self::transmit)
/// is called.
#[derive(Debug)]
pub struct Initiator {
    config: LinkConfig,
    sequence: SequenceCounter,
    state: SessionState,
    faults: Option<FaultInjector>,
}

impl Initiator {
    /// Create an idle initiator.
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            sequence: SequenceCounter::new(config.modulus()),
            state: SessionState::Idle,
            faults: None,
        }
    }

    /// Corrupt outgoing frames at random, for exercising the peer's
    /// rejection path.
    #[must_use]
    pub fn with_fault_injection(mut self, faults: FaultInjector) -> Self {
        self.faults = Some(faults);
        self
    }

    /// Current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState { self.state }

    /// Send `text` as one transfer cycle.
    ///
    /// Each line of `text` becomes one logical line on the wire, split into
    /// frames of at most the configured chunk size.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the handshake is refused, the stream
    /// fails or closes, a reply times out, or a frame is rejected more often
    /// than the [`RetryPolicy`] allows. The session is then
    /// [`Aborted`](SessionState::Aborted).
    pub async fn transmit<T>(
        &mut self,
        link: &mut Link<T>,
        text: &str,
    ) -> Result<TransmitReport, SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        self.sequence.reset();

        let result = self.run_cycle(link, text).await;
        match &result {
            Ok(report) => {
                self.state = SessionState::Done;
                info!(
                    lines = report.lines,
                    frames = report.frames_sent,
                    retransmissions = report.retransmissions,
                    "transmission complete"
                );
            }
            Err(err) => {
                self.state = SessionState::Aborted;
                metrics::inc_errors();
                // No EOT: the peer would deliver the partial text as complete.
                warn!(error = %err, "transmission aborted");
            }
        }
        result
    }

    async fn run_cycle<T>(
        &mut self,
        link: &mut Link<T>,
        text: &str,
    ) -> Result<TransmitReport, SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        self.state = SessionState::AwaitingHandshakeAck;
        link.send(Outbound::Control(ENQ)).await?;
        debug!("sent ENQ");
        match self.next_control(link).await? {
            ACK => debug!("handshake acknowledged"),
            received => return Err(SessionError::HandshakeRejected { received }),
        }

        let policy = self.config.retry_policy();
        let mut partitioner = Partitioner::new(text, self.config.chunk_size());
        let mut report = TransmitReport {
            lines: partitioner.line_count(),
            ..TransmitReport::default()
        };
        let mut attempts = 0u32;
        self.state = SessionState::AwaitingLine;

        while let Some(chunk) = partitioner.next() {
            let frame = self.build_frame(&chunk);
            self.state = SessionState::AwaitingAck;
            link.send(Outbound::Frame(frame.clone())).await?;
            info!(
                sequence = self.sequence.get(),
                frame = %escape(&frame),
                "sent frame"
            );
            report.frames_sent += 1;
            metrics::inc_frames(Direction::Outbound);
            // The counter moves as soon as the frame is out; NAK steps it back.
            self.sequence.advance();

            match self.await_verdict(link).await? {
                Reply::Ack => {
                    attempts = 0;
                    self.state = SessionState::AwaitingLine;
                }
                Reply::Nak => {
                    if !policy.allows(attempts) {
                        return Err(SessionError::RetriesExhausted { attempts });
                    }
                    attempts += 1;
                    report.retransmissions += 1;
                    metrics::inc_retransmissions();
                    self.sequence.retreat();
                    partitioner.rollback();
                    warn!(
                        sequence = self.sequence.get(),
                        attempt = attempts,
                        "frame rejected; retransmitting"
                    );
                    pause(&policy, attempts).await;
                    self.state = SessionState::AwaitingLine;
                }
            }
        }

        link.send(Outbound::Control(EOT)).await?;
        debug!("sent EOT");
        Ok(report)
    }

    fn build_frame(&mut self, chunk: &Chunk) -> Bytes {
        let payload = to_latin1(&chunk.text);
        let mut digit = self.sequence.digit();
        if let Some(faults) = self.faults.as_mut() {
            digit = faults.sequence_digit(digit);
        }
        let mut frame = encode_frame(digit, &payload, !chunk.is_last);
        if let Some(faults) = self.faults.as_mut() {
            frame = faults.checksum(frame);
        }
        debug!(
            valid = validate_checksum(&frame, chunk.terminator()),
            "checked outbound frame checksum"
        );
        frame
    }

    async fn await_verdict<T>(&mut self, link: &mut Link<T>) -> Result<Reply, SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            match self.next_control(link).await? {
                ACK => return Ok(Reply::Ack),
                NAK => return Ok(Reply::Nak),
                other => debug!(byte = other, "ignoring unexpected reply byte"),
            }
        }
    }

    async fn next_control<T>(&mut self, link: &mut Link<T>) -> Result<u8, SessionError>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let waited = self.config.ack_wait();
        loop {
            let item = timeout(waited, link.next())
                .await
                .map_err(|_| SessionError::Timeout { waited })?;
            match item {
                None => return Err(SessionError::Closed),
                Some(Err(err)) => return Err(SessionError::Transport(err)),
                Some(Ok(Inbound::Control(byte))) => return Ok(byte),
                Some(Ok(Inbound::Frame(bytes))) => {
                    warn!(frame = %escape(&bytes), "ignoring frame while awaiting a reply");
                }
            }
        }
    }
}

async fn pause(policy: &RetryPolicy, attempt: u32) {
    let delay = policy.delay_for(attempt);
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
