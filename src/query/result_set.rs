//! Lazily evaluated query results
//!
//! A result set pins the snapshot that was current when the query was issued
//! and re-runs the query from scratch on every pass. Nothing is cached.

use super::{StringQuery, SubstringIndex};
use crate::error::{IndexError, Result};
use crate::index::snapshot::{IndexSnapshot, SnapshotMatches};
use rustc_hash::FxHashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::error;

/// Fixed cost reported to a host query planner
const RETRIEVAL_COST: usize = 100;

pub struct ResultSet<V> {
    snapshot: Arc<IndexSnapshot<V>>,
    query: StringQuery,
}

/// One pass over a result set; values may repeat
pub type ResultIter<'a, V> = SnapshotMatches<'a, V>;

impl<V: Send + Sync> ResultSet<V> {
    /// Fails with `UnsupportedQuery` if the snapshot cannot answer `query`
    pub fn new(snapshot: Arc<IndexSnapshot<V>>, query: StringQuery) -> Result<Self> {
        if !snapshot.supports(query.kind) {
            return Err(IndexError::unsupported(query.kind));
        }
        Ok(Self { snapshot, query })
    }

    pub fn iter(&self) -> ResultIter<'_, V> {
        match self.snapshot.retrieve(&self.query) {
            Ok(matches) => matches,
            Err(e) => {
                // `new` only accepts kinds the pinned snapshot supports
                debug_assert!(false, "validated query rejected: {}", e);
                error!(error = %e, query = %self.query, "validated query rejected by its snapshot");
                SnapshotMatches::Empty
            }
        }
    }

    /// Number of matches, counting repeats
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }

    /// Matching values with repeats removed
    pub fn distinct(&self) -> FxHashSet<&V>
    where
        V: Eq + Hash,
    {
        self.iter().collect()
    }

    pub fn retrieval_cost(&self) -> usize {
        RETRIEVAL_COST
    }

    pub fn merge_cost(&self) -> usize {
        self.len()
    }
}

impl<V> ResultSet<V> {
    pub fn query(&self) -> &StringQuery {
        &self.query
    }

    pub fn snapshot(&self) -> &Arc<IndexSnapshot<V>> {
        &self.snapshot
    }
}

impl<'a, V: Send + Sync> IntoIterator for &'a ResultSet<V> {
    type Item = &'a V;
    type IntoIter = ResultIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V> fmt::Debug for ResultSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("query", &self.query)
            .field("stats", &self.snapshot.stats())
            .finish()
    }
}
