//! Schema-driven conversion between record trees and delimited text.

use tracing::{debug, warn};

use super::{NodeKind, RecordTree, Schema, SchemaNode, Separators, TreeValue};

/// Field whose value is always replaced by the running sequence number.
pub const SEQUENCE_FIELD: &str = "SequenceNumber";

/// Encodes and decodes records against a [`Schema`].
///
/// Top-level fields are joined with the field separator, sub-record fields
/// with the component separator and repeated sub-records with the repeat
/// separator. Values are not escaped: data containing a separator does not
/// survive a round trip.
///
/// ```
/// use labwire::record::{RecordCodec, RecordTree, Schema, SchemaNode};
///
/// let schema = Schema::new(vec![
///     SchemaNode::value("RecordType", "P"),
///     SchemaNode::value("SequenceNumber", ""),
///     SchemaNode::value("PatientId", ""),
/// ]);
/// let tree = RecordTree::new().with("PatientId", "PAT-7");
/// let codec = RecordCodec::default();
/// assert_eq!(codec.encode(&schema, &tree, Some(1)), "P|1|PAT-7");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordCodec {
    separators: Separators,
}

impl RecordCodec {
    /// Create a codec using `separators`.
    #[must_use]
    pub const fn new(separators: Separators) -> Self { Self { separators } }

    /// Separators in use.
    #[must_use]
    pub const fn separators(&self) -> Separators { self.separators }

    /// Render `tree` as one line of text.
    ///
    /// A non-empty schema literal takes precedence over the tree's value.
    /// When `sequence` is given, a top-level [`SEQUENCE_FIELD`] renders it
    /// instead of either.
    #[must_use]
    pub fn encode(&self, schema: &Schema, tree: &RecordTree, sequence: Option<u32>) -> String {
        self.encode_fields(schema, tree, sequence, self.separators.field)
    }

    fn encode_fields(
        &self,
        schema: &Schema,
        tree: &RecordTree,
        sequence: Option<u32>,
        separator: char,
    ) -> String {
        let mut out = String::new();
        for (index, node) in schema.iter().enumerate() {
            if index > 0 {
                out.push(separator);
            }
            out.push_str(&self.encode_node(node, tree.get(&node.name), sequence));
        }
        out
    }

    fn encode_node(&self, node: &SchemaNode, value: Option<&TreeValue>, sequence: Option<u32>) -> String {
        let component = self.separators.component;
        match &node.kind {
            NodeKind::Value(literal) => {
                if let Some(n) = sequence.filter(|_| node.name == SEQUENCE_FIELD) {
                    return n.to_string();
                }
                if !literal.is_empty() {
                    return literal.clone();
                }
                match value {
                    Some(TreeValue::Scalar(text)) => text.clone(),
                    None => String::new(),
                    Some(other) => {
                        mismatch(node, other);
                        String::new()
                    }
                }
            }
            NodeKind::Object(schema) => match value {
                Some(TreeValue::Object(tree)) => self.encode_fields(schema, tree, None, component),
                other => {
                    if let Some(other) = other {
                        mismatch(node, other);
                    }
                    self.encode_fields(schema, &RecordTree::default(), None, component)
                }
            },
            NodeKind::Repeated(schema) => match value {
                Some(TreeValue::List(items)) => {
                    let mut out = String::new();
                    for (index, item) in items.iter().enumerate() {
                        if index > 0 {
                            out.push(self.separators.repeat);
                        }
                        out.push_str(&self.encode_fields(schema, item, None, component));
                    }
                    out
                }
                Some(TreeValue::Object(tree)) => self.encode_fields(schema, tree, None, component),
                other => {
                    if let Some(other) = other {
                        mismatch(node, other);
                    }
                    self.encode_fields(schema, &RecordTree::default(), None, component)
                }
            },
        }
    }

    /// Parse one line of text into a tree shaped by `schema`.
    ///
    /// Missing trailing fields decode as empty text and surplus fields are
    /// dropped. A repeated field yields a list only when its text contains
    /// the repeat separator; a single occurrence decodes as an object.
    #[must_use]
    pub fn decode(&self, schema: &Schema, text: &str) -> RecordTree {
        self.decode_fields(schema, text, self.separators.field)
    }

    fn decode_fields(&self, schema: &Schema, text: &str, separator: char) -> RecordTree {
        let component = self.separators.component;
        let mut tokens = text.split(separator);
        let mut tree = RecordTree::default();
        for node in schema {
            let token = tokens.next().unwrap_or_default();
            let value = match &node.kind {
                NodeKind::Value(_) => TreeValue::Scalar(token.to_owned()),
                NodeKind::Object(schema) => TreeValue::Object(self.decode_fields(schema, token, component)),
                NodeKind::Repeated(schema) => {
                    let parts: Vec<&str> = token.split(self.separators.repeat).collect();
                    if parts.len() > 1 {
                        TreeValue::List(
                            parts
                                .into_iter()
                                .map(|part| self.decode_fields(schema, part, component))
                                .collect(),
                        )
                    } else {
                        TreeValue::Object(self.decode_fields(schema, token, component))
                    }
                }
            };
            tree.insert(node.name.clone(), value);
        }
        let surplus = tokens.count();
        if surplus > 0 {
            debug!(surplus, "ignoring fields beyond the schema");
        }
        tree
    }
}

fn mismatch(node: &SchemaNode, found: &TreeValue) {
    warn!(
        field = %node.name,
        found = found.kind(),
        "record value does not fit its schema node; rendering it empty"
    );
}
