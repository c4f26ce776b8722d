//! Types for suffix array indexing
//!
//! A suffix is never materialized: it is a `(text, offset)` pair resolved
//! against the [`TextArena`] owned by the array that holds it.

use crate::error::{IndexError, Result};
use std::sync::Arc;

/// Identifier of an indexed string inside a [`TextArena`]
pub type TextId = u32;

/// Byte offset of a suffix start (always on a char boundary)
pub type TextOffset = u32;

/// Values attached to a merged suffix node.
///
/// Most suffixes belong to exactly one record, so the common case carries the
/// value inline. Runs of identical suffixes collapse into `Two` or `Many`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuffixValues<V> {
    One(V),
    Two([V; 2]),
    Many(Box<[V]>),
}

impl<V> SuffixValues<V> {
    /// Merge the values of an identical-suffix run headed by `first`.
    pub fn from_run(first: V, rest: Vec<V>) -> Self {
        let mut rest = rest.into_iter();
        match (rest.next(), rest.len()) {
            (None, _) => SuffixValues::One(first),
            (Some(second), 0) => SuffixValues::Two([first, second]),
            (Some(second), _) => SuffixValues::Many(
                std::iter::once(first)
                    .chain(std::iter::once(second))
                    .chain(rest)
                    .collect(),
            ),
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[V] {
        match self {
            SuffixValues::One(v) => std::slice::from_ref(v),
            SuffixValues::Two(pair) => pair,
            SuffixValues::Many(values) => values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn into_vec(self) -> Vec<V> {
        match self {
            SuffixValues::One(v) => vec![v],
            SuffixValues::Two(pair) => pair.into(),
            SuffixValues::Many(values) => values.into_vec(),
        }
    }

    /// Split into the head value and the remaining values of the run.
    fn into_parts(self) -> (V, Vec<V>) {
        match self {
            SuffixValues::One(v) => (v, Vec::new()),
            SuffixValues::Two([a, b]) => (a, vec![b]),
            SuffixValues::Many(values) => {
                let mut values = values.into_vec();
                let head = values.remove(0);
                (head, values)
            }
        }
    }
}

/// Suffix array entry: a view into an arena string plus its owners
#[derive(Debug, Clone)]
pub struct SuffixNode<V> {
    pub(crate) text: TextId,
    pub(crate) offset: TextOffset,
    pub(crate) values: SuffixValues<V>,
}

impl<V> SuffixNode<V> {
    #[inline]
    pub(crate) fn new(text: TextId, offset: TextOffset, value: V) -> Self {
        Self {
            text,
            offset,
            values: SuffixValues::One(value),
        }
    }

    /// Absorb the values of identical suffixes that followed this one.
    pub(crate) fn absorb(self, rest: Vec<V>) -> Self {
        if rest.is_empty() {
            return self;
        }
        let (head, mut tail) = self.values.into_parts();
        tail.extend(rest);
        Self {
            text: self.text,
            offset: self.offset,
            values: SuffixValues::from_run(head, tail),
        }
    }

    /// Take the values out, leaving the view behind.
    pub(crate) fn into_values(self) -> SuffixValues<V> {
        self.values
    }

    #[inline]
    pub fn values(&self) -> &SuffixValues<V> {
        &self.values
    }
}

/// Owned storage for every string indexed by one suffix array.
///
/// Strings are shared `Arc<str>`, so a caller handing in `Arc<str>` keeps
/// a single allocation for both its record and the index.
#[derive(Debug, Clone)]
pub struct TextArena {
    texts: Vec<Arc<str>>,
    bytes: usize,
    max_texts: usize,
    max_text_len: usize,
}

impl Default for TextArena {
    fn default() -> Self {
        Self::with_limits(TextId::MAX as usize, TextOffset::MAX as usize)
    }
}

impl TextArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena holding at most `max_texts` strings of at most `max_text_len` bytes
    ///
    /// Limits above the `u32` id and offset range are clamped to it.
    pub fn with_limits(max_texts: usize, max_text_len: usize) -> Self {
        Self {
            texts: Vec::new(),
            bytes: 0,
            max_texts: max_texts.min(TextId::MAX as usize),
            max_text_len: max_text_len.min(TextOffset::MAX as usize),
        }
    }

    /// Check that `texts` could be pushed, in order, without committing any
    pub fn check_capacity(&self, texts: &[Arc<str>]) -> Result<()> {
        if texts.len() > self.max_texts.saturating_sub(self.texts.len()) {
            return Err(IndexError::CapacityExceeded {
                what: "number of indexed strings",
                limit: self.max_texts as u64,
            });
        }
        if texts.iter().any(|text| text.len() > self.max_text_len) {
            return Err(IndexError::CapacityExceeded {
                what: "string length in bytes",
                limit: self.max_text_len as u64,
            });
        }
        Ok(())
    }

    /// Store a string and return its id
    pub fn push(&mut self, text: Arc<str>) -> Result<TextId> {
        self.check_capacity(std::slice::from_ref(&text))?;
        // max_texts never exceeds TextId::MAX
        let id = self.texts.len() as TextId;
        self.bytes += text.len();
        self.texts.push(text);
        Ok(id)
    }

    #[inline]
    pub fn text(&self, id: TextId) -> &str {
        &self.texts[id as usize]
    }

    /// Bytes of the suffix a node points at
    #[inline]
    pub fn suffix_bytes<V>(&self, node: &SuffixNode<V>) -> &[u8] {
        &self.texts[node.text as usize].as_bytes()[node.offset as usize..]
    }

    /// The suffix a node points at, as text
    #[inline]
    pub fn suffix_str<V>(&self, node: &SuffixNode<V>) -> &str {
        &self.texts[node.text as usize][node.offset as usize..]
    }

    #[inline]
    pub fn suffix_len<V>(&self, node: &SuffixNode<V>) -> usize {
        self.texts[node.text as usize].len() - node.offset as usize
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Total size of stored text
    pub fn byte_size(&self) -> usize {
        self.bytes
    }
}
