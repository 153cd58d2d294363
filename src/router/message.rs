//! Record groups exchanged in one transfer cycle.

use std::{collections::BTreeMap, path::Path};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::record::{RecordCodec, RecordError, RecordTree, Schema};

/// Record type named by the first character of a line.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// `H`
    Header,
    /// `P`
    Patient,
    /// `O`
    Order,
    /// `R`
    Result,
    /// `Q`
    Query,
    /// `L`
    Termination,
}

impl RecordType {
    /// Every record type, in wire order.
    pub const ALL: [Self; 6] = [
        Self::Header,
        Self::Patient,
        Self::Order,
        Self::Result,
        Self::Query,
        Self::Termination,
    ];

    /// Tag character opening a line of this type.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Header => 'H',
            Self::Patient => 'P',
            Self::Order => 'O',
            Self::Result => 'R',
            Self::Query => 'Q',
            Self::Termination => 'L',
        }
    }

    /// Record type for a tag character.
    #[must_use]
    pub const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'H' => Some(Self::Header),
            'P' => Some(Self::Patient),
            'O' => Some(Self::Order),
            'R' => Some(Self::Result),
            'Q' => Some(Self::Query),
            'L' => Some(Self::Termination),
            _ => None,
        }
    }

    /// Classify a line by its first character.
    #[must_use]
    pub fn classify(line: &str) -> Option<Self> { line.chars().next().and_then(Self::from_tag) }

    /// Group name used in schema documents.
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Patient => "Patient",
            Self::Order => "Order",
            Self::Result => "Result",
            Self::Query => "Query",
            Self::Termination => "Termination",
        }
    }
}

/// Decoded content of one transfer cycle, grouped by record type.
///
/// Serialises with one key per group (`Header`, `Patient`, `Order`, ...),
/// which is also the shape of order catalog entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Message {
    /// Header record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<RecordTree>,
    /// Patient records.
    #[serde(rename = "Patient", skip_serializing_if = "Vec::is_empty")]
    pub patients: Vec<RecordTree>,
    /// Order records.
    #[serde(rename = "Order", skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<RecordTree>,
    /// Result records.
    #[serde(rename = "Result", skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<RecordTree>,
    /// Query records.
    #[serde(rename = "Query", skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<RecordTree>,
    /// Termination record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<RecordTree>,
}

impl Message {
    /// Whether the message carries patient, order and result records.
    #[must_use]
    pub fn is_result_delivery(&self) -> bool {
        !self.patients.is_empty() && !self.orders.is_empty() && !self.results.is_empty()
    }

    /// Whether nothing was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// One [`Schema`] per record type.
///
/// A schema document is a JSON object with one key per group, each holding
/// an array of schema nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageSchema {
    /// `H` records.
    pub header: Schema,
    /// `P` records.
    pub patient: Schema,
    /// `O` records.
    pub order: Schema,
    /// `R` records.
    pub result: Schema,
    /// `Q` records.
    pub query: Schema,
    /// `L` records.
    pub termination: Schema,
}

impl MessageSchema {
    /// Parse a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Json`] for malformed JSON or nodes and
    /// [`RecordError::MissingGroup`] if a record group is absent.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let mut groups: BTreeMap<String, Schema> = serde_json::from_str(json)?;
        let mut take = |kind: RecordType| {
            groups
                .remove(kind.group())
                .ok_or(RecordError::MissingGroup { group: kind.group() })
        };
        let schema = Self {
            header: take(RecordType::Header)?,
            patient: take(RecordType::Patient)?,
            order: take(RecordType::Order)?,
            result: take(RecordType::Result)?,
            query: take(RecordType::Query)?,
            termination: take(RecordType::Termination)?,
        };
        for name in groups.keys() {
            warn!(group = %name, "ignoring unknown schema group");
        }
        Ok(schema)
    }

    /// Read and parse a schema document from `path`.
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

    /// Schema for one record type.
    #[must_use]
    pub const fn for_type(&self, kind: RecordType) -> &Schema {
        match kind {
            RecordType::Header => &self.header,
            RecordType::Patient => &self.patient,
            RecordType::Order => &self.order,
            RecordType::Result => &self.result,
            RecordType::Query => &self.query,
            RecordType::Termination => &self.termination,
        }
    }

    /// Render `message` as newline-separated lines in wire order.
    ///
    /// Records in each group are numbered from 1; the header carries no
    /// sequence number.
    #[must_use]
    pub fn encode(&self, codec: &RecordCodec, message: &Message) -> String {
        let mut lines = Vec::new();
        if let Some(header) = &message.header {
            lines.push(codec.encode(&self.header, header, None));
        }
        let groups = [
            (&self.patient, &message.patients),
            (&self.order, &message.orders),
            (&self.result, &message.results),
            (&self.query, &message.queries),
        ];
        for (schema, records) in groups {
            for (sequence, record) in (1u32..).zip(records) {
                lines.push(codec.encode(schema, record, Some(sequence)));
            }
        }
        if let Some(termination) = &message.termination {
            lines.push(codec.encode(&self.termination, termination, Some(1)));
        }
        lines.join("\n")
    }

    /// Group the lines of `batch` by record type and decode each.
    ///
    /// Lines with an unknown tag are skipped; a repeated header or
    /// termination record replaces the earlier one.
    #[must_use]
    pub fn decode(&self, codec: &RecordCodec, batch: &str) -> Message {
        let mut message = Message::default();
        for line in batch.lines().filter(|l| !l.is_empty()) {
            let Some(kind) = RecordType::classify(line) else {
                warn!(line, "skipping line with unknown record type");
                continue;
            };
            let tree = codec.decode(self.for_type(kind), line);
            debug!(record = %kind, "decoded record");
            match kind {
                RecordType::Header => replace_single(&mut message.header, tree, kind),
                RecordType::Patient => message.patients.push(tree),
                RecordType::Order => message.orders.push(tree),
                RecordType::Result => message.results.push(tree),
                RecordType::Query => message.queries.push(tree),
                RecordType::Termination => replace_single(&mut message.termination, tree, kind),
            }
        }
        message
    }
}

fn replace_single(slot: &mut Option<RecordTree>, tree: RecordTree, kind: RecordType) {
    if slot.replace(tree).is_some() {
        warn!(record = %kind, "duplicate record in one message; keeping the last");
    }
}
