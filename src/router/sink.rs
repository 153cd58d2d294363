//! Destinations for completed result deliveries.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::Message;

/// Receives each result delivery decoded by the router.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Accept one delivered message.
    async fn deliver(&self, message: Message);
}

/// Logs deliveries as JSON at `info`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ResultSink for LogSink {
    async fn deliver(&self, message: Message) {
        match serde_json::to_string(&message) {
            Ok(json) => info!(results = message.results.len(), message = %json, "result delivered"),
            Err(err) => warn!(error = %err, "failed to render delivered results"),
        }
    }
}

/// Forwards deliveries to an `mpsc` channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<Message>,
}

impl ChannelSink {
    /// Create a sink and the receiver draining it.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ResultSink for ChannelSink {
    async fn deliver(&self, message: Message) {
        if self.tx.send(message).await.is_err() {
            warn!("result receiver dropped; delivery discarded");
        }
    }
}
