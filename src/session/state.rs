//! Per-connection transfer bookkeeping.

use derive_more::Display;

/// Where a session stands in the handshake/frame exchange.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum SessionState {
    /// No cycle open.
    #[default]
    Idle,
    /// Initiator sent `ENQ` and waits for `ACK`.
    AwaitingHandshakeAck,
    /// Responder received `ENQ` and is acknowledging it.
    Handshaking,
    /// Ready for the next frame (initiator: to send; responder: to receive).
    AwaitingLine,
    /// Initiator sent a frame and waits for `ACK`/`NAK`.
    AwaitingAck,
    /// The cycle closed with `EOT`.
    Done,
    /// The cycle ended on a transport failure, timeout or exhausted retries.
    Aborted,
}

impl SessionState {
    /// Whether a transfer cycle is currently open.
    #[must_use]
    pub const fn in_cycle(self) -> bool {
        matches!(
            self,
            Self::AwaitingHandshakeAck | Self::Handshaking | Self::AwaitingLine | Self::AwaitingAck
        )
    }
}

/// Mutable state of one transfer cycle.
///
/// Created fresh when a cycle opens and replaced when it closes; never
/// shared between connections.
#[derive(Clone, Debug, Default)]
pub struct TransferState {
    /// Text of continuation frames still waiting for their final frame.
    pub accumulation: String,
    /// Logical lines completed so far in this cycle.
    pub completed_lines: Vec<String>,
}

impl TransferState {
    /// Push a chunk; on a final chunk, complete the line and return it.
    pub fn accept_chunk(&mut self, text: &str, is_final: bool) -> Option<&str> {
        self.accumulation.push_str(text);
        if !is_final {
            return None;
        }
        let line = std::mem::take(&mut self.accumulation);
        self.completed_lines.push(line);
        self.completed_lines.last().map(String::as_str)
    }

    /// Join completed lines with LF and reset the state.
    pub fn finish(&mut self) -> String {
        let text = self.completed_lines.join("\n");
        *self = Self::default();
        text
    }
}
