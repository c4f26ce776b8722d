//! Brute-force reference index
//!
//! Scans every string of every record. Used to verify suffix array results
//! and as the "reference" side of the verification pack.

use super::{QueryKind, StringQuery, SubstringIndex};
use crate::error::Result;

pub struct BaselineIndex<V> {
    records: Vec<(V, Vec<String>)>,
}

impl<V> BaselineIndex<V> {
    pub fn new<R, I, S>(records: R) -> Self
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = records
            .into_iter()
            .map(|(value, strings)| (value, strings.into_iter().map(Into::into).collect()))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of records with at least one matching string, each once
    pub fn matching<'a>(&'a self, query: &'a StringQuery) -> impl Iterator<Item = &'a V> + 'a {
        self.records
            .iter()
            .filter(move |(_, strings)| strings.iter().any(|s| query.matches(s)))
            .map(|(value, _)| value)
    }
}

impl<V> SubstringIndex<V> for BaselineIndex<V> {
    type Matches<'a>
        = std::vec::IntoIter<&'a V>
    where
        Self: 'a,
        V: 'a;

    fn supports(&self, _kind: QueryKind) -> bool {
        true
    }

    fn retrieve(&self, query: &StringQuery) -> Result<Self::Matches<'_>> {
        Ok(self
            .records
            .iter()
            .filter(|(_, strings)| strings.iter().any(|s| query.matches(s)))
            .map(|(value, _)| value)
            .collect::<Vec<_>>()
            .into_iter())
    }
}
