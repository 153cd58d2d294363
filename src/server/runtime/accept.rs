//! Accept loop feeding connection tasks.

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use log::warn;
use tokio::{
    net::{TcpListener, TcpStream},
    select,
    time::{Duration, sleep},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::backoff::BackoffConfig;
use crate::{
    config::LinkConfig,
    router::MessageRouter,
    server::connection::{ConnectionContext, spawn_connection_task},
};

/// Source of incoming connections consumed by the accept loop.
///
/// Implementations must be cancellation-safe: dropping a pending `accept()`
/// future must not leak resources.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub(in crate::server) trait AcceptListener: Send + Sync {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl AcceptListener for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> { TcpListener::accept(self).await }

    fn local_addr(&self) -> io::Result<SocketAddr> { TcpListener::local_addr(self) }
}

/// Everything one accept loop needs besides its listener.
#[derive(Clone)]
pub(in crate::server) struct AcceptLoopOptions {
    pub router: Arc<MessageRouter>,
    pub link: LinkConfig,
    pub shutdown: CancellationToken,
    pub tracker: TaskTracker,
    pub backoff: BackoffConfig,
}

/// Accept connections from `listener` until `shutdown` is cancelled.
///
/// Each accepted stream gets its own tracked task. Failed accepts are logged
/// and retried after an exponentially growing pause.
pub(in crate::server) async fn accept_loop<L>(listener: Arc<L>, options: AcceptLoopOptions)
where
    L: AcceptListener + 'static,
{
    let backoff = options.backoff.normalized();
    let mut delay = backoff.initial_delay;
    while let Some(next) = accept_iteration(listener.as_ref(), &options, &backoff, delay).await {
        delay = next;
    }
}

async fn accept_iteration<L>(
    listener: &L,
    options: &AcceptLoopOptions,
    backoff: &BackoffConfig,
    delay: Duration,
) -> Option<Duration>
where
    L: AcceptListener,
{
    select! {
        biased;

        () = options.shutdown.cancelled() => None,
        res = listener.accept() => Some(match res {
            Ok((stream, peer)) => {
                tracing::debug!(%peer, "accepted connection");
                spawn_connection_task(
                    stream,
                    ConnectionContext {
                        router: Arc::clone(&options.router),
                        link: options.link,
                        shutdown: options.shutdown.clone(),
                    },
                    &options.tracker,
                );
                backoff.initial_delay
            }
            Err(e) => {
                let local_addr = listener.local_addr().ok();
                warn!("accept error: error={e:?}, local_addr={local_addr:?}");
                sleep(delay).await;
                backoff.next_delay(delay)
            }
        }),
    }
}
