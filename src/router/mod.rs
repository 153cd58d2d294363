//! Message routing: decide what a received batch of lines calls for.
//!
//! The [`MessageRouter`] decodes the text of a completed transfer cycle into
//! a [`Message`]. A query is answered with the matching catalog order (or a
//! synthesized routine order when none is registered); a full result
//! delivery is handed to the [`ResultSink`].

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

pub mod catalog;
pub mod message;
pub mod sink;

pub use catalog::{InMemoryOrderCatalog, OrderCatalog};
pub use message::{Message, MessageSchema, RecordType};
pub use sink::{ChannelSink, LogSink, ResultSink};

use crate::record::{RecordCodec, RecordTree, Separators, TreeValue};

/// Field names the router reads and writes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterConfig {
    /// Path within a query record to the lookup key.
    pub query_key: Vec<String>,
    /// Order field receiving the key of a synthesized order.
    pub specimen_field: String,
    /// Order field receiving the synthesized priority.
    pub priority_field: String,
    /// Priority flag of a synthesized order.
    pub priority: String,
    /// Order field receiving the time of a synthesized order.
    pub requested_at_field: String,
    /// `chrono` format of that time.
    pub timestamp_format: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            query_key: vec!["StartingRange".into(), "SpecimenId".into()],
            specimen_field: "SpecimenId".into(),
            priority_field: "Priority".into(),
            priority: "R".into(),
            requested_at_field: "RequestedDateTime".into(),
            timestamp_format: "%Y%m%d%H%M%S".into(),
        }
    }
}

/// What to do after routing a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Open a new cycle sending this text.
    Reply(String),
    /// Results were handed to the sink.
    Delivered,
    /// Nothing to act on.
    Ignored,
}

/// Decodes received batches and decides the next outbound message.
pub struct MessageRouter {
    schema: Arc<MessageSchema>,
    codec: RecordCodec,
    catalog: Arc<dyn OrderCatalog>,
    sink: Arc<dyn ResultSink>,
    config: RouterConfig,
}

impl MessageRouter {
    /// Create a router that logs result deliveries.
    #[must_use]
    pub fn new(schema: Arc<MessageSchema>, catalog: Arc<dyn OrderCatalog>) -> Self {
        Self {
            schema,
            codec: RecordCodec::default(),
            catalog,
            sink: Arc::new(LogSink),
            config: RouterConfig::default(),
        }
    }

    /// Send result deliveries to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the field names used for queries and synthesized orders.
    #[must_use]
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `separators` for record text.
    #[must_use]
    pub fn with_separators(mut self, separators: Separators) -> Self {
        self.codec = RecordCodec::new(separators);
        self
    }

    /// Decode a batch of lines.
    #[must_use]
    pub fn decode(&self, batch: &str) -> Message { self.schema.decode(&self.codec, batch) }

    /// Encode a message as a batch of lines.
    #[must_use]
    pub fn encode(&self, message: &Message) -> String { self.schema.encode(&self.codec, message) }

    /// Route `batch` using the local time for synthesized orders.
    pub async fn route(&self, batch: &str) -> RouteOutcome { self.route_at(batch, Local::now().naive_local()).await }

    /// Route `batch`, stamping synthesized orders with `now`.
    pub async fn route_at(&self, batch: &str, now: NaiveDateTime) -> RouteOutcome {
        let message = self.decode(batch);
        if let Some(query) = message.queries.first() {
            return self.answer_query(&message, query, now);
        }
        if message.is_result_delivery() {
            info!(
                patients = message.patients.len(),
                orders = message.orders.len(),
                results = message.results.len(),
                "result delivery received"
            );
            self.sink.deliver(message).await;
            return RouteOutcome::Delivered;
        }
        if !message.is_empty() {
            info!("message holds neither a query nor a complete result delivery");
        }
        RouteOutcome::Ignored
    }

    fn answer_query(&self, request: &Message, query: &RecordTree, now: NaiveDateTime) -> RouteOutcome {
        let key = query
            .lookup(&self.config.query_key)
            .and_then(TreeValue::as_scalar)
            .map(str::trim)
            .unwrap_or_default();
        if key.is_empty() {
            warn!(path = ?self.config.query_key, "query carries no lookup key");
            return RouteOutcome::Ignored;
        }

        let mut reply = if let Some(order) = self.catalog.find(key) {
            info!(key, "answering query from the order catalog");
            order
        } else {
            info!(key, "no catalog order; synthesizing a routine order");
            self.synthesize_order(key, now)
        };
        if reply.header.is_none() {
            reply.header.clone_from(&request.header);
        }
        if reply.termination.is_none() {
            reply.termination.clone_from(&request.termination);
        }
        RouteOutcome::Reply(self.encode(&reply))
    }

    fn synthesize_order(&self, key: &str, now: NaiveDateTime) -> Message {
        let order = RecordTree::new()
            .with(self.config.specimen_field.as_str(), key)
            .with(self.config.priority_field.as_str(), self.config.priority.as_str())
            .with(
                self.config.requested_at_field.as_str(),
                now.format(&self.config.timestamp_format).to_string(),
            );
        Message {
            patients: vec![RecordTree::new()],
            orders: vec![order],
            ..Message::default()
        }
    }
}

#[cfg(test)]
mod tests;
