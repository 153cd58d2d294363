//! Run a real server on an ephemeral localhost port.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
};

use labwire::{config::LinkConfig, router::MessageRouter, server::LinkServer};
use tokio::{sync::oneshot, task::JoinHandle};

/// Create a TCP listener bound to a free local port.
///
/// # Errors
///
/// Returns any IO error encountered while binding to an ephemeral localhost
/// port.
pub fn unused_listener() -> io::Result<StdTcpListener> {
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    StdTcpListener::bind(addr)
}

/// A running server and the means to stop it.
#[derive(Debug)]
pub struct TestServer {
    /// Address the server accepts on.
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Signal shutdown and wait for every connection task to finish.
    ///
    /// # Panics
    ///
    /// Panics if the server task itself panicked.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.expect("server task");
    }
}

/// Bind `router` to a free port and run it until [`TestServer::stop`].
///
/// Returns once the accept loops are running.
///
/// # Panics
///
/// Panics if no port can be bound or the server fails while running.
pub async fn spawn_server(router: MessageRouter, link: LinkConfig) -> TestServer {
    let listener = unused_listener().expect("bind ephemeral port");
    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown, stop) = oneshot::channel::<()>();
    let server = LinkServer::new(router)
        .workers(1)
        .link_config(link)
        .ready_signal(ready_tx)
        .bind_existing_listener(listener)
        .expect("adopt listener");
    let addr = server.local_addr().expect("bound address");
    let handle = tokio::spawn(async move {
        server
            .run_with_shutdown(async {
                let _ = stop.await;
            })
            .await
            .expect("server run");
    });
    ready_rx.await.expect("server ready");
    TestServer {
        addr,
        shutdown,
        handle,
    }
}
