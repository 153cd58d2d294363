//! Errors raised while loading schema documents.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures loading schema or catalog documents.
///
/// Encoding and decoding never fail: a tree that does not fit its schema is
/// logged and the offending field rendered empty.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The document is not valid JSON or does not have the expected shape.
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema node declared zero or several kinds.
    #[error(
        "schema node `{name}` must declare exactly one of `value`, `object` or `repeated` (found \
         {found})"
    )]
    AmbiguousNode {
        /// Name of the offending node.
        name: String,
        /// Number of kind tags present.
        found: usize,
    },

    /// A schema document lacks one of the record groups.
    #[error("schema document has no `{group}` group")]
    MissingGroup {
        /// Name of the absent group.
        group: &'static str,
    },

    /// Reading a document from disk failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}
