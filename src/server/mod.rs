//! Tokio-based TCP listener for the link protocol.
//!
//! `LinkServer` accepts connections and drives each one in its own task: the
//! connection acts as responder until a transfer cycle closes, hands the
//! received text to the [`MessageRouter`] and, when the router asks for a
//! reply, turns initiator on the same stream before listening again.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::oneshot};

use crate::{config::LinkConfig, router::MessageRouter};

/// TCP server answering link-protocol peers.
///
/// The server carries a typestate `S` indicating whether it is [`Unbound`]
/// (not yet bound to a TCP listener) or [`Bound`]. New servers start
/// `Unbound` and must call [`LinkServer::bind`] or
/// [`LinkServer::bind_existing_listener`] before running. Each of the
/// configured workers runs its own accept loop over the shared listener.
pub struct LinkServer<S = Unbound>
where
    S: ServerState,
{
    pub(crate) router: Arc<MessageRouter>,
    pub(crate) link: LinkConfig,
    pub(crate) workers: usize,
    pub(crate) backoff_config: BackoffConfig,
    /// Channel used to notify when the server is ready.
    ///
    /// A `oneshot::Sender` can transmit only one readiness notification, so
    /// a new sender must be supplied each time a server is started.
    pub(crate) ready_tx: Option<oneshot::Sender<()>>,
    pub(crate) state: S,
}

/// Marker indicating the server has not yet bound a listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound;

/// Marker indicating the server is bound to a TCP listener.
#[derive(Debug, Clone)]
pub struct Bound {
    pub(crate) listener: Arc<TcpListener>,
}

/// Trait implemented by [`Unbound`] and [`Bound`] to model binding typestate.
pub trait ServerState: sealed::Sealed {}

mod sealed {
    //! Prevent external implementations of [`ServerState`].

    pub trait Sealed {}
    impl Sealed for super::Unbound {}
    impl Sealed for super::Bound {}
}

impl ServerState for Unbound {}
impl ServerState for Bound {}

mod config;
mod connection;
pub mod error;
mod runtime;

pub use error::ServerError;
/// Re-exported configuration type for accept back-off behaviour.
pub use runtime::BackoffConfig;

#[cfg(test)]
pub(crate) mod test_util;
