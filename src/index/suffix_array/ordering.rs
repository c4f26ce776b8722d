//! Suffix ordering
//!
//! Suffixes compare code point by code point; when one is a prefix of the
//! other the shorter one sorts first, so the empty suffix is the smallest.
//! UTF-8 preserves code point order under bytewise comparison, so every
//! routine here works on byte slices borrowed from the arena.

use std::cmp::Ordering;

/// Compare two suffixes lexicographically
#[inline]
pub fn compare_suffixes(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}

/// Length in bytes of the longest common prefix of two suffixes
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Check whether `suffix` starts with `pattern`
#[inline]
pub fn has_prefix(suffix: &[u8], pattern: &[u8]) -> bool {
    suffix.len() >= pattern.len() && &suffix[..pattern.len()] == pattern
}
