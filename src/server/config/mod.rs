//! Configuration utilities for [`LinkServer`].

use std::sync::Arc;

use tokio::sync::oneshot;

use super::{BackoffConfig, LinkServer, ServerState, Unbound};
use crate::{config::LinkConfig, router::MessageRouter};

pub mod binding;

impl LinkServer<Unbound> {
    /// Create a server routing received text through `router`.
    ///
    /// The worker count defaults to the number of available CPU cores (or 1
    /// if this cannot be determined). Call [`bind`](Self::bind) before
    /// running the server.
    #[must_use]
    pub fn new(router: MessageRouter) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            router: Arc::new(router),
            link: LinkConfig::default(),
            workers,
            backoff_config: BackoffConfig::default(),
            ready_tx: None,
            state: Unbound,
        }
    }
}

impl<S> LinkServer<S>
where
    S: ServerState,
{
    /// Set the number of accept loops to run.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count.max(1);
        self
    }

    /// Set the link settings used by every connection.
    #[must_use]
    pub fn link_config(mut self, config: LinkConfig) -> Self {
        self.link = config;
        self
    }

    /// Configure the back-off applied when `accept()` fails.
    #[must_use]
    pub fn accept_backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff_config = config.normalized();
        self
    }

    /// Configure a channel used to signal when the server is ready to accept
    /// connections.
    #[must_use]
    pub fn ready_signal(mut self, tx: oneshot::Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    /// Returns the configured number of accept loops.
    #[inline]
    #[must_use]
    pub const fn worker_count(&self) -> usize { self.workers }

    /// Returns the link settings applied to connections.
    #[must_use]
    pub const fn link_settings(&self) -> &LinkConfig { &self.link }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::*;
    use crate::server::test_util::router;

    fn expected_default_worker_count() -> usize {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }

    #[rstest]
    fn new_server_defaults(router: MessageRouter) {
        let server = LinkServer::new(router);
        assert_eq!(server.worker_count(), expected_default_worker_count());
        assert!(server.local_addr().is_none());
        assert_eq!(*server.link_settings(), LinkConfig::default());
    }

    #[rstest]
    fn worker_count_is_at_least_one(router: MessageRouter) {
        let server = LinkServer::new(router).workers(4);
        assert_eq!(server.worker_count(), 4);
        assert_eq!(server.workers(0).worker_count(), 1);
    }

    #[rstest]
    fn accept_backoff_is_normalized(router: MessageRouter) {
        let server = LinkServer::new(router).accept_backoff(BackoffConfig {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::ZERO,
        });
        assert_eq!(server.backoff_config.initial_delay, Duration::from_millis(1));
        assert_eq!(server.backoff_config.max_delay, Duration::from_millis(50));
    }

    #[rstest]
    fn link_settings_are_kept(router: MessageRouter) {
        let link = LinkConfig::default().ack_timeout(Duration::from_secs(3));
        let server = LinkServer::new(router).link_config(link);
        assert_eq!(server.link_settings().ack_wait(), Duration::from_secs(3));
    }
}
