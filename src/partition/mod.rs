//! Splitting logical lines into frame-sized chunks.
//!
//! [`next_chunk`] is the pure stepping function; [`Partitioner`] wraps it
//! with the cursor bookkeeping an initiator needs, including a one-chunk
//! [`rollback`](Partitioner::rollback) for retransmission after `NAK`.
//! Lengths are counted in characters, which equal bytes on the Latin-1
//! wire.

use std::num::NonZeroUsize;

use crate::frame::Terminator;

/// Position of the next chunk: a line index and a chunk index within it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartitionCursor {
    /// Index of the line the next chunk comes from.
    pub line: usize,
    /// Index of the next chunk within that line.
    pub partition: usize,
}

/// One frame's worth of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk text.
    pub text: String,
    /// Whether this chunk completes its line.
    pub is_last: bool,
}

impl Chunk {
    /// Terminator a frame carrying this chunk must use.
    #[must_use]
    pub const fn terminator(&self) -> Terminator {
        if self.is_last {
            Terminator::Final
        } else {
            Terminator::Continuation
        }
    }
}

/// Produce the chunk at `cursor` and the cursor that follows it.
///
/// A line no longer than `max` is a single chunk. A longer line yields
/// `ceil(len / max)` chunks of `max` characters, the last possibly
/// shorter. Returns `None` once every line has been consumed.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use labwire::partition::{PartitionCursor, next_chunk};
///
/// let lines = vec!["abcde".to_owned()];
/// let max = NonZeroUsize::new(2).expect("non-zero");
/// let (chunk, next) = next_chunk(&lines, max, PartitionCursor::default()).expect("chunk");
/// assert_eq!(chunk.text, "ab");
/// assert!(!chunk.is_last);
/// assert_eq!(next.partition, 1);
/// ```
#[must_use]
pub fn next_chunk(
    lines: &[String],
    max: NonZeroUsize,
    cursor: PartitionCursor,
) -> Option<(Chunk, PartitionCursor)> {
    let line = lines.get(cursor.line)?;
    let max = max.get();
    let len = line.chars().count();

    if len <= max {
        let next = PartitionCursor {
            line: cursor.line + 1,
            partition: 0,
        };
        return Some((
            Chunk {
                text: line.clone(),
                is_last: true,
            },
            next,
        ));
    }

    let total = len.div_ceil(max);
    let text: String = line.chars().skip(cursor.partition * max).take(max).collect();
    let partition = cursor.partition + 1;
    let (next, is_last) = if partition >= total {
        (
            PartitionCursor {
                line: cursor.line + 1,
                partition: 0,
            },
            true,
        )
    } else {
        (
            PartitionCursor {
                line: cursor.line,
                partition,
            },
            false,
        )
    };
    Some((Chunk { text, is_last }, next))
}

/// Stateful chunk source over the lines of one outbound text.
#[derive(Clone, Debug)]
pub struct Partitioner {
    lines: Vec<String>,
    max: NonZeroUsize,
    cursor: PartitionCursor,
    last: PartitionCursor,
}

impl Partitioner {
    /// Split `text` into lines (LF or CR LF) and prepare to chunk them.
    #[must_use]
    pub fn new(text: &str, max: NonZeroUsize) -> Self {
        Self::from_lines(text.lines().map(str::to_owned).collect(), max)
    }

    /// Chunk an explicit list of lines.
    #[must_use]
    pub fn from_lines(lines: Vec<String>, max: NonZeroUsize) -> Self {
        Self {
            lines,
            max,
            cursor: PartitionCursor::default(),
            last: PartitionCursor::default(),
        }
    }

    /// Number of logical lines.
    #[must_use]
    pub fn line_count(&self) -> usize { self.lines.len() }

    /// Cursor of the next chunk to be produced.
    #[must_use]
    pub const fn cursor(&self) -> PartitionCursor { self.cursor }

    /// Step back to the cursor captured before the most recent chunk, so the
    /// next call regenerates exactly that chunk.
    pub fn rollback(&mut self) { self.cursor = self.last; }
}

impl Iterator for Partitioner {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        let (chunk, next) = next_chunk(&self.lines, self.max, self.cursor)?;
        self.last = self.cursor;
        self.cursor = next;
        Some(chunk)
    }
}
