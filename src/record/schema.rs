//! Positional schema describing how a record maps onto delimited text.

use serde::{Deserialize, Serialize};

use super::RecordError;

/// Ordered field descriptors for one record or sub-record.
///
/// Position is significant: field names never appear on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(Vec<SchemaNode>);

impl Schema {
    /// Build a schema from nodes in wire order.
    #[must_use]
    pub fn new(nodes: Vec<SchemaNode>) -> Self { Self(nodes) }

    /// Parse a schema from a JSON array of nodes.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Json`] if the document is malformed or a node
    /// does not declare exactly one kind.
    pub fn from_json(json: &str) -> Result<Self, RecordError> { Ok(serde_json::from_str(json)?) }

    /// Nodes in wire order.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaNode> { self.0.iter() }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<SchemaNode> for Schema {
    fn from_iter<I: IntoIterator<Item = SchemaNode>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a SchemaNode;
    type IntoIter = std::slice::Iter<'a, SchemaNode>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// What a schema node holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A scalar field with an optional literal that overrides tree data.
    Value(String),
    /// A single nested sub-record.
    Object(Schema),
    /// A nested sub-record that may repeat.
    Repeated(Schema),
}

/// One named field of a [`Schema`].
///
/// In JSON a node is an object with a `name` and exactly one of `value`
/// (a string literal, possibly empty), `object` or `repeated` (a nested
/// schema).
///
/// ```
/// use labwire::record::{NodeKind, Schema};
///
/// let schema = Schema::from_json(
///     r#"[{"name": "RecordType", "value": "Q"},
///         {"name": "StartingRange", "object": [{"name": "SpecimenId", "value": ""}]}]"#,
/// )
/// .expect("valid schema");
/// let mut nodes = schema.iter();
/// assert_eq!(nodes.next().map(|n| &n.kind), Some(&NodeKind::Value("Q".into())));
/// assert!(matches!(nodes.next().map(|n| &n.kind), Some(NodeKind::Object(_))));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNode", into = "RawNode")]
pub struct SchemaNode {
    /// Field name used in the record tree.
    pub name: String,
    /// Field kind.
    pub kind: NodeKind,
}

impl SchemaNode {
    /// A scalar field. An empty `literal` lets tree data through.
    pub fn value(name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Value(literal.into()),
        }
    }

    /// A single nested sub-record.
    pub fn object(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Object(schema),
        }
    }

    /// A repeatable nested sub-record.
    pub fn repeated(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Repeated(schema),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    object: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeated: Option<Schema>,
}

impl TryFrom<RawNode> for SchemaNode {
    type Error = RecordError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let RawNode {
            name,
            value,
            object,
            repeated,
        } = raw;
        match (value, object, repeated) {
            (Some(literal), None, None) => Ok(Self::value(name, literal)),
            (None, Some(schema), None) => Ok(Self::object(name, schema)),
            (None, None, Some(schema)) => Ok(Self::repeated(name, schema)),
            (value, object, repeated) => {
                let found = usize::from(value.is_some())
                    + usize::from(object.is_some())
                    + usize::from(repeated.is_some());
                Err(RecordError::AmbiguousNode { name, found })
            }
        }
    }
}

impl From<SchemaNode> for RawNode {
    fn from(node: SchemaNode) -> Self {
        let mut raw = Self {
            name: node.name,
            value: None,
            object: None,
            repeated: None,
        };
        match node.kind {
            NodeKind::Value(literal) => raw.value = Some(literal),
            NodeKind::Object(schema) => raw.object = Some(schema),
            NodeKind::Repeated(schema) => raw.repeated = Some(schema),
        }
        raw
    }
}
