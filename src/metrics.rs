//! Operation counters for benchmarking.
//!
//! Counters are owned by the caller and passed to the `*_with_counters`
//! operations, so separate trees and repeated runs never share state.

/// Work performed by tree operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounters {
    /// Weight vectors derived while inserting or removing, including the
    /// redistribution done when a leaf is promoted.
    pub build_ops: u64,
    /// Hamming distance computations against stored entries during search.
    pub query_ops: u64,
    /// Weight-vector L1 comparisons made while pruning during search.
    pub prune_ops: u64,
}

impl OpCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every counter before a measured run.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Query work as a percentage of a full linear scan over `entries`.
    pub fn query_ops_ratio(&self, queries: u64, entries: u64) -> f64 {
        if queries == 0 || entries == 0 {
            return 0.0;
        }
        100.0 * self.query_ops as f64 / (queries as f64 * entries as f64)
    }
}
