//! # SXI - Suffix Array Substring Index
//!
//! SXI is an immutable, in-memory secondary index over string attributes of
//! records. Given a search string it returns every record that has a string
//! containing it, or ending with it, in time logarithmic in the number of
//! indexed suffixes.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Suffix array construction, sharded builds, snapshot publication
//! - [`query`] - Query model, lazy result sets, and a brute-force baseline
//! - [`error`] - Error taxonomy shared by every index flavour
//! - [`utils`] - Progress bars and random record generation
//!
//! ## Quick Start
//!
//! ```ignore
//! use sxi::index::SuffixArray;
//!
//! let index = SuffixArray::build([
//!     (1, vec!["ASDK", "EEF"]),
//!     (2, vec!["DKI"]),
//! ])?;
//!
//! for value in index.contains("DK") {
//!     println!("{}", value);
//! }
//! ```
//!
//! ## Updates
//!
//! An index is never modified in place. [`index::SnapshotIndex`] builds a
//! replacement from the full record set and swaps it in atomically; readers
//! holding the old snapshot keep reading it until they drop it.

pub mod error;
pub mod index;
pub mod query;
pub mod utils;

pub use error::{IndexError, Result};
pub use index::{IndexConfig, IndexSnapshot, ShardedIndex, SnapshotIndex, SuffixArray};
pub use query::{QueryKind, ResultSet, StringQuery, SubstringIndex};
