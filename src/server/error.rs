//! Errors raised by [`LinkServer`](super::LinkServer) operations.

use std::io;

use thiserror::Error;

/// Errors that may occur while setting up the server.
///
/// Accept failures are retried with back-off and per-connection failures are
/// logged; neither surfaces here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or configuring the listener failed.
    #[error("bind error: {0}")]
    Bind(#[source] io::Error),
}
