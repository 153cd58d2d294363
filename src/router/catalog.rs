//! Lookup of pre-registered orders by specimen identifier.

use std::{collections::HashMap, path::Path};

use super::Message;
use crate::record::RecordError;

/// Read-only source of orders, shared by every connection.
pub trait OrderCatalog: Send + Sync {
    /// Order message registered under `key`, compared case-insensitively.
    fn find(&self, key: &str) -> Option<Message>;
}

/// Catalog held in memory.
///
/// The JSON form maps each key to a [`Message`]:
///
/// ```
/// use labwire::router::{InMemoryOrderCatalog, OrderCatalog};
///
/// let catalog = InMemoryOrderCatalog::from_json(
///     r#"{"SPEC-1": {"Order": [{"SpecimenId": "SPEC-1", "Priority": "S"}]}}"#,
/// )
/// .expect("valid catalog");
/// let order = catalog.find("spec-1").expect("case-insensitive match");
/// assert_eq!(order.orders[0].scalar("Priority"), Some("S"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderCatalog {
    entries: HashMap<String, Message>,
}

impl InMemoryOrderCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Register `message` under `key`, replacing any earlier entry.
    pub fn insert(&mut self, key: &str, message: Message) { self.entries.insert(normalize(key), message); }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let raw: HashMap<String, Message> = serde_json::from_str(json)?;
        Ok(raw.into_iter().collect())
    }

    /// Read and parse a catalog document from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Io`] if the file cannot be read, otherwise as
    /// [`from_json`](Self::from_json).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RecordError::Io {
                path: path.to_owned(),
                source,
            })?;
        Self::from_json(&json)
    }
}

impl<K: AsRef<str>> FromIterator<(K, Message)> for InMemoryOrderCatalog {
    fn from_iter<I: IntoIterator<Item = (K, Message)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (key, message) in iter {
            catalog.insert(key.as_ref(), message);
        }
        catalog
    }
}

impl OrderCatalog for InMemoryOrderCatalog {
    fn find(&self, key: &str) -> Option<Message> { self.entries.get(&normalize(key)).cloned() }
}

fn normalize(key: &str) -> String { key.trim().to_lowercase() }
