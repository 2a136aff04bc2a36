//! The stored unit: a caller-chosen id and a 64-bit code.

use crate::metrics::OpCounters;

/// An indexed code and the id it was inserted under.
///
/// Two entries are equal only if both id and code match. Several entries may
/// share a code, and the tree never merges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entry {
    pub id: i64,
    pub code: u64,
}

impl Entry {
    #[inline]
    pub const fn new(id: i64, code: u64) -> Self {
        Self { id, code }
    }

    /// Hamming distance between the two codes.
    #[inline]
    pub fn distance(&self, other: &Entry) -> u32 {
        (self.code ^ other.code).count_ones()
    }

    /// Hamming distance to a raw code.
    #[inline]
    pub fn distance_to(&self, code: u64) -> u32 {
        (self.code ^ code).count_ones()
    }

    #[inline]
    pub(crate) fn counted_distance_to(&self, code: u64, counters: &mut OpCounters) -> u32 {
        counters.query_ops += 1;
        self.distance_to(code)
    }
}

impl From<(i64, u64)> for Entry {
    fn from((id, code): (i64, u64)) -> Self {
        Self::new(id, code)
    }
}
