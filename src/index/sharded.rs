//! Sharded suffix array index
//!
//! Records are dealt round-robin into K shards by arrival position, never by
//! key: substring queries cannot be routed, so shards exist only to build in
//! parallel. Every query fans out to all shards and concatenates the results.

use crate::error::{IndexError, Result};
use crate::index::suffix_array::{Matches, SuffixArray, SuffixArrayBuilder};
use crate::index::types::{IndexConfig, IndexStats};
use crate::query::{QueryKind, StringQuery, SubstringIndex};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::iter::{FusedIterator, Flatten};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// K independently built suffix arrays queried as one
#[derive(Debug, Clone)]
pub struct ShardedIndex<V> {
    shards: Box<[SuffixArray<V>]>,
}

impl<V: Clone + Send + Sync> ShardedIndex<V> {
    /// Build `shard_count` shards on `pool`, waiting for all of them
    pub fn build<R, I, S>(records: R, shard_count: usize, pool: &ThreadPool) -> Result<Self>
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S> + Send,
        S: Into<Arc<str>>,
    {
        let config = IndexConfig {
            shard_count,
            ..IndexConfig::default()
        };
        Self::build_with(records, &config, pool)
    }

    pub fn build_with<R, I, S>(records: R, config: &IndexConfig, pool: &ThreadPool) -> Result<Self>
    where
        R: IntoIterator<Item = (V, I)>,
        I: IntoIterator<Item = S> + Send,
        S: Into<Arc<str>>,
    {
        config.validate()?;
        let started = Instant::now();
        let shard_count = config.shard_count;

        let mut partitions: Vec<Vec<(V, I)>> = (0..shard_count).map(|_| Vec::new()).collect();
        for (i, record) in records.into_iter().enumerate() {
            partitions[i % shard_count].push(record);
        }

        let shards = pool.install(|| {
            partitions
                .into_par_iter()
                .enumerate()
                .map(|(shard, records)| build_shard(shard, records, config))
                .collect::<Result<Vec<_>>>()
        });

        let shards = match shards {
            Ok(shards) => shards.into_boxed_slice(),
            Err(e) => {
                warn!(error = %e, "sharded build failed");
                return Err(e);
            }
        };

        let index = Self { shards };
        let stats = index.stats();
        info!(
            shard_count,
            record_count = stats.record_count,
            node_count = stats.node_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built sharded suffix index"
        );
        Ok(index)
    }
}

impl<V> ShardedIndex<V> {
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn shards(&self) -> &[SuffixArray<V>] {
        &self.shards
    }

    /// Values of records with a string containing `pattern`, across all shards
    pub fn contains(&self, pattern: &str) -> ShardedMatches<'_, V> {
        let per_shard: Vec<Matches<'_, V>> = self.shards.iter().map(|shard| shard.contains(pattern)).collect();
        ShardedMatches {
            inner: per_shard.into_iter().flatten(),
        }
    }

    pub fn stats(&self) -> IndexStats {
        let mut total = IndexStats::default();
        for shard in self.shards.iter() {
            total += shard.stats();
        }
        total
    }
}

/// Build one shard, turning errors and panics into a `BuildFailure`
fn build_shard<V, I, S>(shard: usize, records: Vec<(V, I)>, config: &IndexConfig) -> Result<SuffixArray<V>>
where
    V: Clone + Send + Sync,
    I: IntoIterator<Item = S>,
    S: Into<Arc<str>>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<SuffixArray<V>> {
        let mut builder = SuffixArrayBuilder::new(config);
        for (value, strings) in records {
            builder.add_record(value, strings)?;
        }
        Ok(builder.build())
    }));

    match outcome {
        Ok(Ok(array)) => Ok(array),
        Ok(Err(e)) => Err(IndexError::BuildFailure {
            shard,
            reason: e.to_string(),
        }),
        Err(payload) => Err(IndexError::BuildFailure {
            shard,
            reason: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "shard task panicked".to_string()
    }
}

/// Create the bounded worker pool used for shard builds
///
/// `threads == 0` lets rayon pick one thread per CPU.
pub fn build_worker_pool(threads: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("sxi-shard-{}", i))
        .build()
        .map_err(|e| IndexError::WorkerPool(e.to_string()))
}

impl<V: Send + Sync> SubstringIndex<V> for ShardedIndex<V> {
    type Matches<'a>
        = ShardedMatches<'a, V>
    where
        Self: 'a,
        V: 'a;

    fn supports(&self, kind: QueryKind) -> bool {
        kind == QueryKind::Contains
    }

    fn retrieve(&self, query: &StringQuery) -> Result<ShardedMatches<'_, V>> {
        match query.kind {
            QueryKind::Contains => Ok(self.contains(&query.value)),
            kind => Err(IndexError::unsupported(kind)),
        }
    }
}

/// Concatenation of per-shard matches, in shard order
pub struct ShardedMatches<'a, V> {
    inner: Flatten<std::vec::IntoIter<Matches<'a, V>>>,
}

impl<'a, V> Iterator for ShardedMatches<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        self.inner.next()
    }
}

impl<V> FusedIterator for ShardedMatches<'_, V> {}
