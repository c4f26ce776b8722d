//! Suffix array builder
//!
//! Builds a suffix array from a collection of records by:
//! 1. Emitting one suffix per code point of every indexed string
//! 2. Sorting all suffixes (in parallel for large inputs)
//! 3. Computing the LCP array by comparing adjacent suffixes
//! 4. Collapsing runs of identical suffixes into one node per run
//!
//! The LCP pass is the naive O(n * L) pairwise comparison. Indexed strings
//! are short aliases, so this stays well below the sort cost.

use super::array::SuffixArray;
use super::ordering::{common_prefix_len, compare_suffixes};
use super::types::*;
use crate::error::Result;
use crate::index::types::{IndexConfig, IndexStats};
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Builder for constructing suffix arrays from records
pub struct SuffixArrayBuilder<V> {
    parallel_sort_threshold: usize,
    arena: TextArena,
    /// Owner of every stored string, by text id
    owners: Vec<V>,
    /// Total suffixes to emit (one per code point)
    suffix_count: usize,
    record_count: usize,
}

impl<V: Clone + Send + Sync> SuffixArrayBuilder<V> {
    /// Create a new suffix array builder with the given configuration
    pub fn new(config: &IndexConfig) -> Self {
        Self::with_arena(config, TextArena::new())
    }

    /// Create a builder that fills `arena`, enforcing its capacity limits
    pub fn with_arena(config: &IndexConfig, arena: TextArena) -> Self {
        Self {
            parallel_sort_threshold: config.parallel_sort_threshold,
            arena,
            owners: Vec::new(),
            suffix_count: 0,
            record_count: 0,
        }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(&IndexConfig::default())
    }

    /// Add a record and all of its strings
    ///
    /// Empty strings have no suffixes and are skipped. A record that does
    /// not fit is rejected whole and leaves the builder unchanged.
    pub fn add_record<I, S>(&mut self, value: V, strings: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let texts: Vec<Arc<str>> = strings
            .into_iter()
            .map(Into::into)
            .filter(|text: &Arc<str>| !text.is_empty())
            .collect();
        self.arena.check_capacity(&texts)?;

        for text in texts {
            self.suffix_count += text.chars().count();
            self.arena.push(text)?;
            self.owners.push(value.clone());
        }
        self.record_count += 1;
        Ok(())
    }

    /// Get the number of suffixes accumulated so far
    pub fn suffix_count(&self) -> usize {
        self.suffix_count
    }

    /// Get the number of records added
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Build the suffix array from accumulated records
    pub fn build(self) -> SuffixArray<V> {
        let started = Instant::now();
        let Self {
            parallel_sort_threshold,
            arena,
            owners,
            suffix_count,
            record_count,
        } = self;

        let mut nodes = emit_suffixes(&arena, owners, suffix_count);
        sort_suffixes(&arena, &mut nodes, parallel_sort_threshold);
        let lcp = compute_lcp(&arena, &nodes, parallel_sort_threshold);
        let (nodes, lcp) = merge_identical(&arena, nodes, lcp);

        let stats = IndexStats {
            shard_count: 1,
            record_count,
            string_count: arena.len(),
            suffix_count,
            node_count: nodes.len(),
            text_bytes: arena.byte_size(),
        };

        debug!(
            suffix_count,
            node_count = stats.node_count,
            record_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built suffix array"
        );

        SuffixArray::from_parts(arena, nodes, lcp, stats)
    }
}

/// Emit one single-value node per (string, char offset)
fn emit_suffixes<V: Clone>(arena: &TextArena, owners: Vec<V>, suffix_count: usize) -> Vec<SuffixNode<V>> {
    let mut nodes = Vec::with_capacity(suffix_count);
    for (text, owner) in owners.into_iter().enumerate() {
        let text = text as TextId;
        for (offset, _) in arena.text(text).char_indices() {
            nodes.push(SuffixNode::new(text, offset as TextOffset, owner.clone()));
        }
    }
    nodes
}

/// Sort suffixes in place
///
/// Uses rayon above `parallel_threshold`, a plain unstable sort otherwise.
/// Equal suffixes are merged afterwards, so stability does not matter.
fn sort_suffixes<V: Send>(arena: &TextArena, nodes: &mut [SuffixNode<V>], parallel_threshold: usize) {
    let cmp = |a: &SuffixNode<V>, b: &SuffixNode<V>| {
        compare_suffixes(arena.suffix_bytes(a), arena.suffix_bytes(b))
    };

    if nodes.len() > parallel_threshold {
        nodes.par_sort_unstable_by(cmp);
    } else {
        nodes.sort_unstable_by(cmp);
    }
}

/// Compute `lcp[i]` between sorted suffixes `i - 1` and `i`; `lcp[0] = 0`
fn compute_lcp<V: Sync>(arena: &TextArena, nodes: &[SuffixNode<V>], parallel_threshold: usize) -> Vec<u32> {
    let mut lcp = vec![0u32; nodes.len()];
    if nodes.len() < 2 {
        return lcp;
    }

    let pair_lcp = |i: usize| {
        common_prefix_len(arena.suffix_bytes(&nodes[i - 1]), arena.suffix_bytes(&nodes[i])) as u32
    };

    if nodes.len() > parallel_threshold {
        lcp[1..]
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = pair_lcp(i + 1));
    } else {
        for (i, slot) in lcp.iter_mut().enumerate().skip(1) {
            *slot = pair_lcp(i);
        }
    }
    lcp
}

/// Whether sorted suffix `i` is character-for-character equal to `i - 1`
#[inline]
fn same_as_previous(prev_len: usize, len: usize, lcp: u32) -> bool {
    len == prev_len && lcp as usize == len
}

/// Collapse each maximal run of identical suffixes into one node
///
/// A run keeps the position of its first element and that element's LCP with
/// the preceding run, so LCP values between groups are unchanged.
fn merge_identical<V>(
    arena: &TextArena,
    nodes: Vec<SuffixNode<V>>,
    lcp: Vec<u32>,
) -> (Vec<SuffixNode<V>>, Vec<u32>) {
    if nodes.len() <= 1 {
        return (nodes, lcp);
    }

    let mut group_count = 1;
    let mut prev_len = arena.suffix_len(&nodes[0]);
    for i in 1..nodes.len() {
        let len = arena.suffix_len(&nodes[i]);
        if !same_as_previous(prev_len, len, lcp[i]) {
            group_count += 1;
        }
        prev_len = len;
    }

    if group_count == nodes.len() {
        return (nodes, lcp);
    }

    let mut merged = Vec::with_capacity(group_count);
    let mut merged_lcp = Vec::with_capacity(group_count);
    let mut head: Option<SuffixNode<V>> = None;
    let mut run: Vec<V> = Vec::new();
    let mut prev_len = 0;

    for (node, node_lcp) in nodes.into_iter().zip(lcp) {
        let len = arena.suffix_len(&node);
        match head.take() {
            Some(first) if same_as_previous(prev_len, len, node_lcp) => {
                match node.into_values() {
                    SuffixValues::One(value) => run.push(value),
                    values => run.extend(values.into_vec()),
                }
                head = Some(first);
            }
            previous => {
                if let Some(first) = previous {
                    merged.push(first.absorb(std::mem::take(&mut run)));
                }
                merged_lcp.push(node_lcp);
                head = Some(node);
            }
        }
        prev_len = len;
    }
    if let Some(first) = head {
        merged.push(first.absorb(run));
    }

    (merged, merged_lcp)
}
