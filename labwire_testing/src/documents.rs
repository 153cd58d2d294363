//! The demonstration schema, catalog and batches shipped under `demos/`.

use std::sync::Arc;

use labwire::router::{InMemoryOrderCatalog, MessageRouter, MessageSchema};

/// Schema document covering every record type.
pub const SCHEMA: &str = include_str!("../../demos/schema.json");
/// Order catalog with a single entry for `SPEC-1001`.
pub const CATALOG: &str = include_str!("../../demos/catalog.json");
/// Query batch asking for `SPEC-1001`.
pub const QUERY: &str = include_str!("../../demos/query.txt");
/// Complete result delivery batch.
pub const RESULTS: &str = include_str!("../../demos/results.txt");

/// Parse [`SCHEMA`].
///
/// # Panics
///
/// Panics if the bundled document is invalid.
#[must_use]
pub fn demo_schema() -> Arc<MessageSchema> {
    Arc::new(MessageSchema::from_json(SCHEMA).expect("bundled schema parses"))
}

/// Parse [`CATALOG`].
///
/// # Panics
///
/// Panics if the bundled document is invalid.
#[must_use]
pub fn demo_catalog() -> InMemoryOrderCatalog {
    InMemoryOrderCatalog::from_json(CATALOG).expect("bundled catalog parses")
}

/// Router over the bundled schema and catalog, logging result deliveries.
#[must_use]
pub fn demo_router() -> MessageRouter { MessageRouter::new(demo_schema(), Arc::new(demo_catalog())) }
