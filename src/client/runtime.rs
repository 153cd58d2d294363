//! Link client runtime implementation.

use std::fmt;

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpStream, ToSocketAddrs},
    time::{Duration, timeout},
};
use tracing::{debug, info};

use super::ClientError;
use crate::{
    config::LinkConfig,
    session::{self, Initiator, Link, Responder, TransmitReport},
    simulation::FaultInjector,
};

/// Trait alias for stream types that can carry a link.
pub trait ClientStream: AsyncRead + AsyncWrite + Unpin {}
impl<T> ClientStream for T where T: AsyncRead + AsyncWrite + Unpin {}

/// Client for a single link connection.
///
/// # Examples
///
/// ```no_run
/// use labwire::{client::LinkClient, config::LinkConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), labwire::client::ClientError> {
/// let mut client = LinkClient::connect("127.0.0.1:5000", LinkConfig::default()).await?;
/// client.send("H|\\^&\nL|1|N").await?;
/// # Ok(())
/// # }
/// ```
pub struct LinkClient<T = TcpStream>
where
    T: ClientStream,
{
    link: Link<T>,
    config: LinkConfig,
    initiator: Initiator,
    responder: Responder,
}

impl<T> fmt::Debug for LinkClient<T>
where
    T: ClientStream,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkClient")
            .field("config", &self.config)
            .field("state", &self.initiator.state())
            .finish_non_exhaustive()
    }
}

impl LinkClient<TcpStream> {
    /// Connect to `addr` over TCP.
    ///
    /// # Errors
    /// Returns [`ClientError::Io`] if the connection cannot be established.
    pub async fn connect<A: ToSocketAddrs>(addr: A, config: LinkConfig) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        if let Ok(peer) = stream.peer_addr() {
            info!(%peer, "connected");
        }
        Ok(Self::from_stream(stream, config))
    }
}

impl<T> LinkClient<T>
where
    T: ClientStream,
{
    /// Wrap an already connected stream.
    #[must_use]
    pub fn from_stream(stream: T, config: LinkConfig) -> Self {
        Self {
            link: session::link(stream, &config),
            config,
            initiator: Initiator::new(config),
            responder: Responder::new(config),
        }
    }

    /// Corrupt outgoing frames at random to exercise the peer's rejection
    /// path.
    #[must_use]
    pub fn with_fault_injection(mut self, faults: FaultInjector) -> Self {
        self.initiator = Initiator::new(self.config).with_fault_injection(faults);
        self
    }

    /// Settings this client was created with.
    #[must_use]
    pub const fn config(&self) -> &LinkConfig { &self.config }

    /// Transmit `text` as one complete transfer cycle.
    ///
    /// # Errors
    /// Returns [`ClientError::Session`] if the cycle aborts.
    pub async fn send(&mut self, text: &str) -> Result<TransmitReport, ClientError> {
        Ok(self.initiator.transmit(&mut self.link, text).await?)
    }

    /// Wait for the peer to deliver one transfer cycle.
    ///
    /// Returns `Ok(None)` if the peer closes the stream before opening a
    /// cycle. Waits indefinitely for the cycle to start; see
    /// [`receive_within`](Self::receive_within) for a bounded wait.
    ///
    /// # Errors
    /// Returns [`ClientError::Session`] if the cycle aborts once started.
    pub async fn receive(&mut self) -> Result<Option<String>, ClientError> {
        let reply = self.responder.receive(&mut self.link).await?;
        if reply.is_none() {
            debug!("peer closed the connection");
        }
        Ok(reply)
    }

    /// Like [`receive`](Self::receive), giving up after `wait`.
    ///
    /// # Errors
    /// Returns [`ClientError::ReplyTimeout`] if no complete cycle arrives in
    /// time, or [`ClientError::Session`] if the cycle aborts.
    pub async fn receive_within(&mut self, wait: Duration) -> Result<Option<String>, ClientError> {
        match timeout(wait, self.receive()).await {
            Ok(res) => res,
            Err(_) => Err(ClientError::ReplyTimeout { waited: wait }),
        }
    }

    /// Transmit `text`, then wait up to `wait` for the peer's reply.
    ///
    /// # Errors
    /// Propagates the failures of [`send`](Self::send) and
    /// [`receive_within`](Self::receive_within).
    pub async fn call(&mut self, text: &str, wait: Duration) -> Result<Option<String>, ClientError> {
        self.send(text).await?;
        self.receive_within(wait).await
    }

    /// Consume the client and return the framed stream.
    #[must_use]
    pub fn into_link(self) -> Link<T> { self.link }
}
