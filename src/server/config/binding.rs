//! Listener binding for [`LinkServer`].

use std::{
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use tokio::net::TcpListener;

use crate::server::{Bound, LinkServer, ServerError, Unbound};

impl LinkServer<Unbound> {
    /// Return `None` as the server is not bound.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> { None }

    /// Bind to a fresh address.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if binding or configuring the listener fails.
    pub fn bind(self, addr: SocketAddr) -> Result<LinkServer<Bound>, ServerError> {
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_existing_listener(std_listener)
    }

    /// Bind to an existing `StdTcpListener`.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if configuring the listener fails.
    pub fn bind_existing_listener(
        self,
        std_listener: StdTcpListener,
    ) -> Result<LinkServer<Bound>, ServerError> {
        std_listener
            .set_nonblocking(true)
            .map_err(ServerError::Bind)?;
        let listener = TcpListener::from_std(std_listener).map_err(ServerError::Bind)?;
        let LinkServer {
            router,
            link,
            workers,
            backoff_config,
            ready_tx,
            state: Unbound,
        } = self;
        Ok(LinkServer {
            router,
            link,
            workers,
            backoff_config,
            ready_tx,
            state: Bound {
                listener: Arc::new(listener),
            },
        })
    }
}

impl LinkServer<Bound> {
    /// Returns the bound address, or `None` if retrieving it fails.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.state.listener.local_addr().ok() }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        router::MessageRouter,
        server::test_util::{free_listener, router},
    };

    #[rstest]
    #[tokio::test]
    async fn existing_listener_keeps_its_address(router: MessageRouter, free_listener: StdTcpListener) {
        let expected = free_listener.local_addr().expect("listener address");
        let server = LinkServer::new(router)
            .bind_existing_listener(free_listener)
            .expect("bind");
        assert_eq!(server.local_addr(), Some(expected));
    }

    #[rstest]
    #[tokio::test]
    async fn binding_an_address_in_use_fails(router: MessageRouter, free_listener: StdTcpListener) {
        let taken = free_listener.local_addr().expect("listener address");
        let err = LinkServer::new(router).bind(taken).err().expect("address in use");
        assert!(matches!(err, ServerError::Bind(_)));
    }
}
