//! Metric helpers for `labwire`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper is a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking active connections.
pub const CONNECTIONS_ACTIVE: &str = "labwire_connections_active";
/// Name of the counter tracking frames written or received.
pub const FRAMES_PROCESSED: &str = "labwire_frames_processed_total";
/// Name of the counter tracking frames answered with `NAK`.
pub const FRAMES_REJECTED: &str = "labwire_frames_rejected_total";
/// Name of the counter tracking frames sent again after `NAK`.
pub const RETRANSMISSIONS: &str = "labwire_retransmissions_total";
/// Name of the counter tracking aborted transfer cycles.
pub const ERRORS_TOTAL: &str = "labwire_errors_total";
/// Name of the counter tracking panicking connection tasks.
pub const CONNECTION_PANICS: &str = "labwire_connection_panics_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames received from the peer.
    Inbound,
    /// Frames sent to the peer.
    Outbound,
}

impl Direction {
    /// Label value used for the `direction` label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record a frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a frame answered with `NAK`.
pub fn inc_rejected() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_REJECTED).increment(1);
}

/// Record a retransmitted frame.
pub fn inc_retransmissions() {
    #[cfg(feature = "metrics")]
    counter!(RETRANSMISSIONS).increment(1);
}

/// Record an aborted transfer cycle.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL).increment(1);
}

/// Record a connection task that panicked.
pub fn inc_connection_panics() {
    #[cfg(feature = "metrics")]
    counter!(CONNECTION_PANICS).increment(1);
}
