//! Suffix array indexing module
//!
//! This module provides O(m log n + k) substring search using a suffix array
//! with an LCP array over every suffix of every indexed string.
//!
//! ## Architecture
//!
//! - `types`: Suffix nodes, merged value holders and the text arena
//! - `ordering`: Code point ordering and prefix helpers over suffixes
//! - `builder`: Constructs suffix arrays from records
//! - `array`: The immutable array and its `contains` / `ends_with` queries

pub mod array;
pub mod builder;
pub mod ordering;
pub mod types;

pub use array::{Matches, SuffixArray};
pub use builder::SuffixArrayBuilder;
pub use types::{SuffixNode, SuffixValues, TextArena, TextId, TextOffset};
