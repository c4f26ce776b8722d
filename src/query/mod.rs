//! Query model shared by every index flavour.
//!
//! The host collection hands over a [`StringQuery`] (a kind tag plus a search
//! string). Indexes answer the kinds they support and reject the rest with
//! [`IndexError::UnsupportedQuery`] before any result is produced.

pub mod baseline;
pub mod result_set;

pub use baseline::BaselineIndex;
pub use result_set::ResultSet;

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of a string query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    /// Some string contains the search string
    Contains,
    /// Some string ends with the search string
    EndsWith,
    StartsWith,
    Equal,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::Contains => "Contains",
            QueryKind::EndsWith => "EndsWith",
            QueryKind::StartsWith => "StartsWith",
            QueryKind::Equal => "Equal",
        };
        f.write_str(name)
    }
}

/// A query against the strings of a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringQuery {
    pub kind: QueryKind,
    pub value: String,
}

impl StringQuery {
    pub fn new(kind: QueryKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn contains(value: impl Into<String>) -> Self {
        Self::new(QueryKind::Contains, value)
    }

    pub fn ends_with(value: impl Into<String>) -> Self {
        Self::new(QueryKind::EndsWith, value)
    }

    pub fn starts_with(value: impl Into<String>) -> Self {
        Self::new(QueryKind::StartsWith, value)
    }

    pub fn equal(value: impl Into<String>) -> Self {
        Self::new(QueryKind::Equal, value)
    }

    /// Reference semantics of this query against a single string
    pub fn matches(&self, text: &str) -> bool {
        match self.kind {
            QueryKind::Contains => text.contains(self.value.as_str()),
            QueryKind::EndsWith => text.ends_with(self.value.as_str()),
            QueryKind::StartsWith => text.starts_with(self.value.as_str()),
            QueryKind::Equal => text == self.value,
        }
    }
}

impl fmt::Display for StringQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.kind, self.value)
    }
}

/// An immutable index answering string queries with values of type `V`
///
/// Results are lazy and may repeat a value once per matching suffix.
/// Mutation entrypoints exist so a host collection can forward its own
/// add/remove/clear calls; they always fail, since updating means building
/// a new index and publishing it.
pub trait SubstringIndex<V> {
    type Matches<'a>: Iterator<Item = &'a V>
    where
        Self: 'a,
        V: 'a;

    fn supports(&self, kind: QueryKind) -> bool;

    /// Run a query; unsupported kinds are rejected immediately
    fn retrieve(&self, query: &StringQuery) -> Result<Self::Matches<'_>>;

    fn add_all(&self, _values: &[V]) -> Result<()> {
        Err(IndexError::ImmutabilityViolation { operation: "add_all" })
    }

    fn remove_all(&self, _values: &[V]) -> Result<()> {
        Err(IndexError::ImmutabilityViolation {
            operation: "remove_all",
        })
    }

    fn clear(&self) -> Result<()> {
        Err(IndexError::ImmutabilityViolation { operation: "clear" })
    }

    fn is_mutable(&self) -> bool {
        false
    }
}
