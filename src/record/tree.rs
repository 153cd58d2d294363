//! Structured record data mirroring a [`Schema`](super::Schema).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field values of one record, keyed by field name.
///
/// Serialises as a plain JSON object whose values are strings, nested
/// objects or arrays of objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordTree(BTreeMap<String, TreeValue>);

/// Value held by one field of a [`RecordTree`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeValue {
    /// Leaf text.
    Scalar(String),
    /// Repeated sub-records.
    List(Vec<RecordTree>),
    /// A single sub-record.
    Object(RecordTree),
}

impl RecordTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Set `name` to `value`, returning the tree for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TreeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set `name` to `value`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<TreeValue>) -> Option<TreeValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TreeValue> { self.0.get(name) }

    /// Text stored under `name`, if it is a scalar.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&str> { self.get(name).and_then(TreeValue::as_scalar) }

    /// Follow `path` through nested objects.
    ///
    /// A list along the way resolves to its first element.
    ///
    /// ```
    /// use labwire::record::RecordTree;
    ///
    /// let tree = RecordTree::new().with(
    ///     "StartingRange",
    ///     RecordTree::new().with("SpecimenId", "SPEC-1"),
    /// );
    /// let id = tree
    ///     .lookup(&["StartingRange", "SpecimenId"])
    ///     .and_then(|v| v.as_scalar());
    /// assert_eq!(id, Some("SPEC-1"));
    /// ```
    #[must_use]
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&TreeValue> {
        let (first, rest) = path.split_first()?;
        let value = self.get(first.as_ref())?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            TreeValue::Object(tree) => tree.lookup(rest),
            TreeValue::List(items) => items.first()?.lookup(rest),
            TreeValue::Scalar(_) => None,
        }
    }

    /// Iterate over fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize { self.0.len() }

    /// Whether the tree holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<K: Into<String>, V: Into<TreeValue>> FromIterator<(K, V)> for RecordTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl TreeValue {
    /// The text of a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// The sub-record of an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&RecordTree> {
        match self {
            Self::Object(tree) => Some(tree),
            _ => None,
        }
    }

    /// The sub-records of a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[RecordTree]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for TreeValue {
    fn from(text: &str) -> Self { Self::Scalar(text.to_owned()) }
}

impl From<String> for TreeValue {
    fn from(text: String) -> Self { Self::Scalar(text) }
}

impl From<RecordTree> for TreeValue {
    fn from(tree: RecordTree) -> Self { Self::Object(tree) }
}

impl From<Vec<RecordTree>> for TreeValue {
    fn from(items: Vec<RecordTree>) -> Self { Self::List(items) }
}
