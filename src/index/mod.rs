pub mod sharded;
pub mod snapshot;
pub mod suffix_array;
pub mod types;

pub use sharded::{ShardedIndex, build_worker_pool};
pub use snapshot::{IndexSnapshot, SnapshotIndex, SnapshotSlot};
pub use suffix_array::{SuffixArray, SuffixArrayBuilder};
pub use types::*;
