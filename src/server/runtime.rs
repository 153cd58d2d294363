//! Runtime control for [`LinkServer`].

mod accept;
mod backoff;

use std::sync::Arc;

#[cfg(test)]
pub(super) use accept::MockAcceptListener;
pub(super) use accept::{AcceptLoopOptions, accept_loop};
pub use backoff::BackoffConfig;
use futures::Future;
use log::warn;
use tokio::{select, signal};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{Bound, LinkServer, ServerError};

impl LinkServer<Bound> {
    /// Run the server until Ctrl+C is received.
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use labwire::{
    ///     router::{InMemoryOrderCatalog, MessageRouter, MessageSchema},
    ///     server::LinkServer,
    /// };
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let schema = Arc::new(MessageSchema::load("schema.json").await?);
    /// let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new()));
    /// LinkServer::new(router)
    ///     .bind(([0, 0, 0, 0], 5000).into())?
    ///     .run()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Currently infallible once bound; accept failures are retried with
    /// exponential back-off and do not surface as errors.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Run the server until the `shutdown` future resolves.
    ///
    /// On shutdown the accept loops stop, open connections are cancelled and
    /// the call returns once every connection task has finished.
    ///
    /// # Errors
    ///
    /// Currently infallible once bound; see [`run`](Self::run).
    pub async fn run_with_shutdown<S>(self, shutdown: S) -> Result<(), ServerError>
    where
        S: Future<Output = ()> + Send,
    {
        let LinkServer {
            router,
            link,
            workers,
            backoff_config,
            ready_tx,
            state: Bound { listener },
        } = self;
        let shutdown_token = CancellationToken::new();
        let tracker = TaskTracker::new();
        let options = AcceptLoopOptions {
            router,
            link,
            shutdown: shutdown_token.clone(),
            tracker: tracker.clone(),
            backoff: backoff_config,
        };

        for _ in 0..workers {
            tracker.spawn(accept_loop(Arc::clone(&listener), options.clone()));
        }

        // Signal readiness after all workers have been spawned.
        if let Some(tx) = ready_tx
            && tx.send(()).is_err()
        {
            warn!("Failed to send readiness signal: receiver dropped");
        }

        select! {
            () = shutdown => shutdown_token.cancel(),
            () = tracker.wait() => {},
        }

        tracker.close();
        tracker.wait().await;
        Ok(())
    }
}
