//! Per-connection task for [`LinkServer`](super::LinkServer).

use std::{net::SocketAddr, sync::Arc};

use futures::FutureExt;
use log::warn;
use tokio::{net::TcpStream, select};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info};

use crate::{
    config::LinkConfig,
    metrics,
    panic::report_connection_panic,
    router::{MessageRouter, RouteOutcome},
    session::{self, Initiator, Link, Responder, SessionError},
};

/// Shared collaborators handed to every connection task.
pub(super) struct ConnectionContext {
    pub router: Arc<MessageRouter>,
    pub link: LinkConfig,
    pub shutdown: CancellationToken,
}

/// Spawn a task to serve one TCP connection, logging and discarding any
/// panics.
pub(super) fn spawn_connection_task(stream: TcpStream, context: ConnectionContext, tracker: &TaskTracker) {
    let peer_addr = match stream.peer_addr() {
        Ok(addr) => Some(addr),
        Err(e) => {
            warn!("Failed to retrieve peer address: error={e}");
            None
        }
    };
    tracker.spawn(async move {
        let fut = std::panic::AssertUnwindSafe(serve(stream, peer_addr, context)).catch_unwind();
        if let Err(panic) = fut.await {
            report_connection_panic(panic.as_ref(), peer_addr);
        }
    });
}

struct ActiveConnection;

impl ActiveConnection {
    fn open() -> Self {
        metrics::inc_connections();
        Self
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) { metrics::dec_connections(); }
}

async fn serve(stream: TcpStream, peer_addr: Option<SocketAddr>, context: ConnectionContext) {
    let _active = ActiveConnection::open();
    let ConnectionContext {
        router,
        link: config,
        shutdown,
    } = context;
    let mut link = session::link(stream, &config);
    let mut responder = Responder::new(config);
    info!(?peer_addr, "connection open");

    loop {
        let received = select! {
            biased;

            () = shutdown.cancelled() => Err(SessionError::Cancelled),
            res = responder.receive(&mut link) => res,
        };
        let batch = match received {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(err) => {
                if end_of_connection(&err, peer_addr) {
                    break;
                }
                continue;
            }
        };
        info!(?peer_addr, lines = batch.lines().count(), batch = %batch, "transmission received");

        if let RouteOutcome::Reply(reply) = router.route(&batch).await
            && let Err(err) = send_reply(&mut link, config, &reply, &shutdown).await
            && end_of_connection(&err, peer_addr)
        {
            break;
        }
    }
    info!(?peer_addr, "connection closed");
}

async fn send_reply(
    link: &mut Link<TcpStream>,
    config: LinkConfig,
    reply: &str,
    shutdown: &CancellationToken,
) -> Result<(), SessionError> {
    let mut initiator = Initiator::new(config);
    let report = select! {
        biased;

        () = shutdown.cancelled() => return Err(SessionError::Cancelled),
        res = initiator.transmit(link, reply) => res?,
    };
    debug!(
        frames = report.frames_sent,
        retransmissions = report.retransmissions,
        "reply delivered"
    );
    Ok(())
}

/// Log `err` and decide whether the connection is finished.
fn end_of_connection(err: &SessionError, peer_addr: Option<SocketAddr>) -> bool {
    match err {
        SessionError::Cancelled => {
            debug!(?peer_addr, "server shutting down; closing connection");
            true
        }
        err if err.is_transport() => {
            warn!("connection lost: error={err}, peer_addr={peer_addr:?}");
            true
        }
        err => {
            tracing::warn!(error = %err, ?peer_addr, "transfer cycle abandoned; awaiting next ENQ");
            false
        }
    }
}
