//! Built suffix array and its range queries
//!
//! Both queries are O(m log n + k): one binary search for the left bound,
//! then a forward walk over the LCP array while adjacent suffixes keep
//! sharing the pattern.

use super::builder::SuffixArrayBuilder;
use super::ordering::{compare_suffixes, has_prefix};
use super::types::*;
use crate::error::{IndexError, Result};
use crate::index::types::{IndexConfig, IndexStats};
use crate::query::{QueryKind, StringQuery, SubstringIndex};
use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Immutable suffix array over the strings of a fixed record set
///
/// Nodes are sorted by suffix ordering with identical suffixes merged, and
/// `lcp[i]` is the exact common prefix length of nodes `i - 1` and `i`.
#[derive(Debug, Clone)]
pub struct SuffixArray<V> {
    arena: TextArena,
    nodes: Box<[SuffixNode<V>]>,
    lcp: Box<[u32]>,
    stats: IndexStats,
}

impl<V> SuffixArray<V> {
    pub(crate) fn from_parts(
        arena: TextArena,
        nodes: Vec<SuffixNode<V>>,
        lcp: Vec<u32>,
        stats: IndexStats,
    ) -> Self {
        debug_assert_eq!(nodes.len(), lcp.len());
        Self {
            arena,
            nodes: nodes.into_boxed_slice(),
            lcp: lcp.into_boxed_slice(),
            stats,
        }
    }

    /// An array with no suffixes; every query on it is empty
    pub fn empty() -> Self {
        Self::from_parts(
            TextArena::new(),
            Vec::new(),
            Vec::new(),
            IndexStats {
                shard_count: 1,
                ..IndexStats::default()
            },
        )
    }

    /// Number of (merged) suffix nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Suffix text of node `i`
    pub fn suffix(&self, i: usize) -> Option<&str> {
        self.nodes.get(i).map(|node| self.arena.suffix_str(node))
    }

    /// Values attached to node `i`
    pub fn values(&self, i: usize) -> Option<&SuffixValues<V>> {
        self.nodes.get(i).map(SuffixNode::values)
    }

    pub fn lcp(&self) -> &[u32] {
        &self.lcp
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    #[inline]
    fn suffix_bytes(&self, i: usize) -> &[u8] {
        self.arena.suffix_bytes(&self.nodes[i])
    }

    /// Index of the rightmost suffix strictly less than `pattern`
    ///
    /// Returns `None` when every suffix is greater than or equal to it.
    pub fn find_left_bound(&self, pattern: &str) -> Option<usize> {
        let pattern = pattern.as_bytes();
        let below = self.nodes.partition_point(|node| {
            compare_suffixes(self.arena.suffix_bytes(node), pattern) == Ordering::Less
        });
        below.checked_sub(1)
    }

    #[inline]
    fn run_start(&self, pattern: &str) -> usize {
        self.find_left_bound(pattern).map_or(0, |i| i + 1)
    }

    /// Values of records with a string containing `pattern`
    ///
    /// Might return the same value multiple times: once per matching suffix
    /// node. The empty pattern matches every node.
    pub fn contains(&self, pattern: &str) -> Matches<'_, V> {
        let start = self.run_start(pattern);
        if start < self.nodes.len() && has_prefix(self.suffix_bytes(start), pattern.as_bytes()) {
            Matches::new(self, start, RunRule::SharesPrefix(pattern.len()))
        } else {
            Matches::empty(self)
        }
    }

    /// Values of records with a string ending with `pattern`
    ///
    /// Only suffixes exactly equal to `pattern` qualify, so the empty pattern
    /// matches nothing.
    pub fn ends_with(&self, pattern: &str) -> Matches<'_, V> {
        let start = self.run_start(pattern);
        if start < self.nodes.len() && self.suffix_bytes(start) == pattern.as_bytes() {
            Matches::new(self, start, RunRule::Equals(pattern.len()))
        } else {
            Matches::empty(self)
        }
    }
}

impl<V: Clone + Send + Sync> SuffixArray<V> {
    /// Build from `(value, strings)` records with the default configuration
    pub fn build<R, I, S>(records: R) -> Result<Self>
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        Self::build_with(records, &IndexConfig::default())
    }

    pub fn build_with<R, I, S>(records: R, config: &IndexConfig) -> Result<Self>
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let mut builder = SuffixArrayBuilder::new(config);
        for (value, strings) in records {
            builder.add_record(value, strings)?;
        }
        Ok(builder.build())
    }
}

impl<V: Send + Sync> SubstringIndex<V> for SuffixArray<V> {
    type Matches<'a>
        = Matches<'a, V>
    where
        Self: 'a,
        V: 'a;

    fn supports(&self, kind: QueryKind) -> bool {
        matches!(kind, QueryKind::Contains | QueryKind::EndsWith)
    }

    fn retrieve(&self, query: &StringQuery) -> Result<Matches<'_, V>> {
        match query.kind {
            QueryKind::Contains => Ok(self.contains(&query.value)),
            QueryKind::EndsWith => Ok(self.ends_with(&query.value)),
            kind => Err(IndexError::unsupported(kind)),
        }
    }
}

/// Condition for node `i > start` to stay in a matching run
#[derive(Debug, Clone, Copy)]
enum RunRule {
    /// `lcp[i] >= len`: shares the pattern with its predecessor
    SharesPrefix(usize),
    /// `lcp[i] == len` and the suffix is exactly `len` bytes long
    Equals(usize),
}

/// Lazy sequence of values attached to a contiguous run of suffix nodes
pub struct Matches<'a, V> {
    array: &'a SuffixArray<V>,
    /// Next node to examine
    next: usize,
    rule: RunRule,
    values: std::slice::Iter<'a, V>,
}

impl<'a, V> Matches<'a, V> {
    fn new(array: &'a SuffixArray<V>, start: usize, rule: RunRule) -> Self {
        Self {
            array,
            next: start + 1,
            rule,
            values: array.nodes[start].values().as_slice().iter(),
        }
    }

    fn empty(array: &'a SuffixArray<V>) -> Self {
        let none: &'a [V] = &[];
        Self {
            array,
            next: array.nodes.len(),
            rule: RunRule::SharesPrefix(0),
            values: none.iter(),
        }
    }

    /// Whether node `i` continues the run (its predecessor is known to match)
    #[inline]
    fn continues(&self, i: usize) -> bool {
        let lcp = self.array.lcp[i] as usize;
        match self.rule {
            RunRule::SharesPrefix(len) => lcp >= len,
            RunRule::Equals(len) => lcp == len && self.array.arena.suffix_len(&self.array.nodes[i]) == len,
        }
    }
}

impl<'a, V> Iterator for Matches<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        loop {
            if let Some(value) = self.values.next() {
                return Some(value);
            }
            let i = self.next;
            if i >= self.array.nodes.len() || !self.continues(i) {
                self.next = self.array.nodes.len();
                return None;
            }
            self.values = self.array.nodes[i].values().as_slice().iter();
            self.next = i + 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.values.len(), None)
    }
}

impl<V> FusedIterator for Matches<'_, V> {}
