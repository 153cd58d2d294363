//! Record codec: structured records to and from delimited text.
//!
//! A [`Schema`] lists the positional fields of one record type. The
//! [`RecordCodec`] walks a schema and a [`RecordTree`] together to produce
//! one line such as `O|1|SPEC-1^^|...|R`, and parses such a line back into a
//! tree.

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod error;
pub mod schema;
pub mod tree;

pub use codec::{RecordCodec, SEQUENCE_FIELD};
pub use error::RecordError;
pub use schema::{NodeKind, Schema, SchemaNode};
pub use tree::{RecordTree, TreeValue};

/// Characters delimiting fields at each nesting level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Separators {
    /// Between top-level fields (`|`).
    pub field: char,
    /// Between fields of a sub-record (`^`).
    pub component: char,
    /// Between occurrences of a repeated sub-record (`\`).
    pub repeat: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repeat: '\\',
        }
    }
}

#[cfg(test)]
mod tests;
