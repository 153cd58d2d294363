//! Reporting of panics caught in connection tasks.

use std::{any::Any, borrow::Cow, net::SocketAddr};

use log::error;

/// Best-effort text of a panic payload.
///
/// `String` and `&'static str` payloads are returned as-is; anything else
/// falls back to its `Debug` rendering.
///
/// ```
/// use labwire::panic::panic_message;
///
/// let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// let payload: Box<dyn std::any::Any + Send> = Box::new(5_u32);
/// assert!(panic_message(payload.as_ref()).contains("Any"));
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> Cow<'_, str> {
    if let Some(s) = payload.downcast_ref::<String>() {
        Cow::Borrowed(s)
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("{payload:?}"))
    }
}

/// Log a connection task panic and count it.
///
/// Emitted through both `log` and `tracing` so either kind of subscriber
/// sees it.
pub fn report_connection_panic(payload: &(dyn Any + Send), peer_addr: Option<SocketAddr>) {
    crate::metrics::inc_connection_panics();
    let message = panic_message(payload);
    error!("connection task panicked: panic={message}, peer_addr={peer_addr:?}");
    tracing::error!(panic = %message, ?peer_addr, "connection task panicked");
}
