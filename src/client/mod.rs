//! Client side of a link connection.
//!
//! [`LinkClient`] owns one framed stream and plays the initiator role for
//! outgoing transmissions. After sending it can switch to the responder role
//! to collect the peer's reply cycle on the same stream.

mod error;
mod runtime;

pub use error::ClientError;
pub use runtime::{ClientStream, LinkClient};
