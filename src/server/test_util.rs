//! Test helpers shared across server modules.

use std::{
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use rstest::fixture;

use super::{Bound, LinkServer};
use crate::router::{InMemoryOrderCatalog, Message, MessageRouter, MessageSchema, OrderCatalog};

pub const SCHEMA: &str = include_str!("../../demos/schema.json");
pub const QUERY: &str = include_str!("../../demos/query.txt");

/// Catalog whose lookups always panic, for exercising task isolation.
pub struct PanickingCatalog;

impl OrderCatalog for PanickingCatalog {
    fn find(&self, _key: &str) -> Option<Message> { panic!("catalog unavailable") }
}

pub fn schema() -> Arc<MessageSchema> { Arc::new(MessageSchema::from_json(SCHEMA).expect("demo schema")) }

#[fixture]
pub fn router() -> MessageRouter { MessageRouter::new(schema(), Arc::new(InMemoryOrderCatalog::new())) }

#[fixture]
/// Returns a bound [`StdTcpListener`] on a free port for use in tests.
///
/// Keeping the listener bound prevents race conditions where another
/// process could claim the port between discovery and use.
pub fn free_listener() -> StdTcpListener {
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    StdTcpListener::bind(addr).expect("Failed to bind free port listener")
}

pub fn bind_server(router: MessageRouter, listener: StdTcpListener) -> LinkServer<Bound> {
    LinkServer::new(router)
        .workers(1)
        .bind_existing_listener(listener)
        .expect("Failed to bind")
}
