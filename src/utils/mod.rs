//! Utility functions shared by the CLI, benchmarks and tests.
//!
//! - [`progress`] - Progress bars, no-op without the `progress` feature
//! - [`records`] - Seeded random records and query probes

pub mod progress;
pub mod records;

pub use records::{Record, generate_records};
