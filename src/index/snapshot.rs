//! Snapshot publication
//!
//! A built index is published into a single atomically swappable slot.
//! Readers load an `Arc` and keep querying it for as long as they hold it;
//! a rebuild constructs the replacement off to the side and swaps it in only
//! once it is complete. A failed rebuild leaves the old snapshot in place.

use crate::error::Result;
use crate::index::sharded::{ShardedIndex, ShardedMatches, build_worker_pool};
use crate::index::suffix_array::{Matches, SuffixArray};
use crate::index::types::{IndexConfig, IndexStats};
use crate::query::{QueryKind, ResultSet, StringQuery, SubstringIndex};
use arc_swap::ArcSwap;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Single-writer, multi-reader slot holding the current snapshot
pub struct SnapshotSlot<T> {
    current: ArcSwap<T>,
    generation: AtomicU64,
    /// Serializes rebuilds; readers never take it
    writer: Mutex<()>,
}

impl<T> SnapshotSlot<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            generation: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// Get the currently published snapshot
    pub fn current(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Atomically replace the snapshot, returning the new generation
    pub fn publish(&self, next: T) -> u64 {
        self.publish_arc(Arc::new(next))
    }

    pub fn publish_arc(&self, next: Arc<T>) -> u64 {
        let _writer = self.lock_writer();
        self.store(next)
    }

    /// Build a replacement and publish it only if the build succeeds
    pub fn rebuild<F>(&self, build: F) -> Result<u64>
    where
        F: FnOnce() -> Result<T>,
    {
        let _writer = self.lock_writer();
        match build() {
            Ok(next) => Ok(self.store(Arc::new(next))),
            Err(e) => {
                warn!(error = %e, generation = self.generation(), "rebuild failed, keeping current snapshot");
                Err(e)
            }
        }
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Caller holds the writer lock
    fn store(&self, next: Arc<T>) -> u64 {
        self.current.store(next);
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of publishes so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// A published index: one suffix array or a sharded set of them
#[derive(Debug, Clone)]
pub enum IndexSnapshot<V> {
    Single(SuffixArray<V>),
    Sharded(ShardedIndex<V>),
}

impl<V> IndexSnapshot<V> {
    pub fn stats(&self) -> IndexStats {
        match self {
            IndexSnapshot::Single(array) => array.stats(),
            IndexSnapshot::Sharded(index) => index.stats(),
        }
    }
}

impl<V> Default for IndexSnapshot<V> {
    fn default() -> Self {
        IndexSnapshot::Single(SuffixArray::empty())
    }
}

impl<V: Send + Sync> SubstringIndex<V> for IndexSnapshot<V> {
    type Matches<'a>
        = SnapshotMatches<'a, V>
    where
        Self: 'a,
        V: 'a;

    fn supports(&self, kind: QueryKind) -> bool {
        match self {
            IndexSnapshot::Single(array) => array.supports(kind),
            IndexSnapshot::Sharded(index) => index.supports(kind),
        }
    }

    fn retrieve(&self, query: &StringQuery) -> Result<SnapshotMatches<'_, V>> {
        match self {
            IndexSnapshot::Single(array) => array.retrieve(query).map(SnapshotMatches::Single),
            IndexSnapshot::Sharded(index) => index.retrieve(query).map(SnapshotMatches::Sharded),
        }
    }
}

pub enum SnapshotMatches<'a, V> {
    Single(Matches<'a, V>),
    Sharded(ShardedMatches<'a, V>),
    Empty,
}

impl<'a, V> Iterator for SnapshotMatches<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        match self {
            SnapshotMatches::Single(matches) => matches.next(),
            SnapshotMatches::Sharded(matches) => matches.next(),
            SnapshotMatches::Empty => None,
        }
    }
}

/// Read-only substring index as seen by a host collection
///
/// ```ignore
/// let index = SnapshotIndex::new(IndexConfig::default())?;
/// index.init(records)?;
/// let hits = index.retrieve(StringQuery::contains("DK"))?;
/// for value in hits.iter() { /* ... */ }
/// ```
pub struct SnapshotIndex<V> {
    config: IndexConfig,
    pool: Option<Arc<ThreadPool>>,
    slot: SnapshotSlot<IndexSnapshot<V>>,
}

impl<V: Clone + Send + Sync> SnapshotIndex<V> {
    /// Create an index with an empty published snapshot
    ///
    /// Sharded configurations get their own worker pool.
    pub fn new(config: IndexConfig) -> Result<Self> {
        config.validate()?;
        let pool = if config.is_sharded() {
            Some(Arc::new(build_worker_pool(config.worker_threads)?))
        } else {
            None
        };
        Ok(Self::with_parts(config, pool))
    }

    /// Create an index that builds shards on a caller-supplied pool
    pub fn with_pool(config: IndexConfig, pool: Arc<ThreadPool>) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_parts(config, Some(pool)))
    }

    fn with_parts(config: IndexConfig, pool: Option<Arc<ThreadPool>>) -> Self {
        Self {
            config,
            pool,
            slot: SnapshotSlot::new(IndexSnapshot::default()),
        }
    }

    /// Build from the full record set and publish the result
    pub fn init<R, I, S>(&self, records: R) -> Result<u64>
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S> + Send,
        S: Into<Arc<str>>,
    {
        let generation = self.slot.rebuild(|| match &self.pool {
            Some(pool) if self.config.is_sharded() => {
                ShardedIndex::build_with(records, &self.config, pool).map(IndexSnapshot::Sharded)
            }
            _ => SuffixArray::build_with(records, &self.config).map(IndexSnapshot::Single),
        })?;

        info!(
            generation,
            shard_count = self.config.shard_count,
            "published suffix index snapshot"
        );
        Ok(generation)
    }

    /// Publish an index built elsewhere
    pub fn publish(&self, snapshot: IndexSnapshot<V>) -> u64 {
        self.slot.publish(snapshot)
    }
}

impl<V> SnapshotIndex<V> {
    /// Answer a query against the snapshot current at call time
    pub fn retrieve(&self, query: StringQuery) -> Result<ResultSet<V>>
    where
        V: Send + Sync,
    {
        ResultSet::new(self.slot.current(), query)
    }

    pub fn current(&self) -> Arc<IndexSnapshot<V>> {
        self.slot.current()
    }

    pub fn generation(&self) -> u64 {
        self.slot.generation()
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn stats(&self) -> IndexStats {
        self.slot.current().stats()
    }

    pub fn add_all(&self, values: &[V]) -> Result<()>
    where
        V: Send + Sync,
    {
        self.reject_mutation(|snapshot| snapshot.add_all(values))
    }

    pub fn remove_all(&self, values: &[V]) -> Result<()>
    where
        V: Send + Sync,
    {
        self.reject_mutation(|snapshot| snapshot.remove_all(values))
    }

    pub fn clear(&self) -> Result<()>
    where
        V: Send + Sync,
    {
        self.reject_mutation(|snapshot| snapshot.clear())
    }

    pub fn is_mutable(&self) -> bool {
        false
    }

    fn reject_mutation<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&IndexSnapshot<V>) -> Result<()>,
    {
        let snapshot = self.slot.current();
        let result = mutate(snapshot.as_ref());
        if let Err(e) = &result {
            warn!(error = %e, "rejected mutation of read-only index");
        }
        result
    }
}
