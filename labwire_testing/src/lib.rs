//! Utilities for exercising `labwire` links in tests.
//!
//! Frame builders produce wire bytes by hand, [`drive_responder`] feeds raw
//! bytes through a [`Responder`](labwire::session::Responder) over an
//! in-memory duplex stream, and [`spawn_server`] runs a real
//! [`LinkServer`](labwire::server::LinkServer) on an ephemeral port.
//!
//! ```rust
//! use labwire_testing::{drive_responder, enq, eot, final_frame};
//!
//! # async fn example() -> std::io::Result<()> {
//! let outcome = drive_responder(vec![enq(), final_frame(1, "H|\\^&"), eot()]).await?;
//! assert_eq!(outcome.delivered, ["H|\\^&"]);
//! # Ok(())
//! # }
//! ```

pub mod documents;
pub mod frames;
pub mod helpers;
pub mod metrics;
pub mod server;

pub use documents::{CATALOG, QUERY, RESULTS, SCHEMA, demo_catalog, demo_router, demo_schema};
pub use frames::{ack, continuation_frame, enq, eot, final_frame, nak, with_checksum};
pub use helpers::{DriveOutcome, drive_responder, drive_responder_with};
pub use metrics::{counter_value, debugging_recorder_setup};
pub use server::{TestServer, spawn_server, unused_listener};
