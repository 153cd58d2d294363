#![doc(html_root_url = "https://docs.rs/labwire/latest")]
//! Public API for the `labwire` library.
//!
//! This crate implements a point-to-point laboratory instrument link: text
//! is split into checksummed, numbered frames and exchanged over a byte
//! stream with an `ENQ`/`ACK`/`NAK`/`EOT` handshake. On top of the link, a
//! schema-driven record codec and message router answer order queries and
//! accept result deliveries.

pub mod client;
pub mod config;
pub mod control;
pub mod frame;
pub mod metrics;
pub mod panic;
pub mod partition;
pub mod record;
pub mod router;
pub mod sequence;
pub mod server;
pub mod session;
pub mod simulation;

pub use client::{ClientError, LinkClient};
pub use config::LinkConfig;
pub use frame::{Checksum, FrameError, Inbound, LinkCodec, Outbound, Terminator};
pub use metrics::{CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};
pub use record::{RecordCodec, RecordError, RecordTree, Schema, Separators, TreeValue};
pub use router::{Message, MessageRouter, MessageSchema, OrderCatalog, ResultSink, RouteOutcome};
pub use server::{LinkServer, ServerError};
pub use session::{Initiator, Responder, RetryPolicy, SessionError, SessionState};
