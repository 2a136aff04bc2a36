//! Weight vectors: hierarchical popcounts of a 64-bit code.
//!
//! At level `L` a code is cut into `2^L` contiguous segments of `64 / 2^L`
//! bits and each segment's popcount becomes one weight, most significant
//! segment first:
//!
//! ```text
//! level 0:  [            popcount(code)            ]
//! level 1:  [  popcount(hi 32)  |  popcount(lo 32)  ]
//! level 2:  [ 16 | 16 | 16 | 16 ]
//! ...
//! level 6:  64 single-bit weights
//! ```
//!
//! The L1 distance between two weight vectors of the same level never exceeds
//! the Hamming distance between the codes they were derived from. Hamming
//! distance splits additively over the segments, and a single bit flip moves
//! a segment's popcount by at most one. Internal nodes use this as their
//! pruning bound.

use crate::error::HwtError;

/// Number of bits in an indexed code, and the number of weight slots.
pub const CODE_BITS: usize = 64;

/// Deepest partition level: every segment is a single bit.
pub const MAX_LEVEL: u8 = 6;

/// Popcounts of a code's bit segments at one partition level.
///
/// Only the first `2^level` slots are populated; the rest stay zero so they
/// never contribute to [`WeightVector::l1_distance`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeightVector {
    weights: [u8; CODE_BITS],
}

impl WeightVector {
    /// Derives the weight vector of `code` at `level`.
    ///
    /// ```
    /// use hwtree::WeightVector;
    ///
    /// let wv = WeightVector::derive(0xFFFF_0000_0000_000F, 2).unwrap();
    /// assert_eq!(&wv.as_slice()[..4], &[16, 0, 0, 4]);
    /// assert!(WeightVector::derive(0, 7).is_err());
    /// ```
    pub fn derive(code: u64, level: u8) -> Result<Self, HwtError> {
        if level > MAX_LEVEL {
            return Err(HwtError::LevelOutOfRange {
                level,
                max: MAX_LEVEL,
            });
        }
        Ok(Self::derive_unchecked(code, level))
    }

    /// Same as [`WeightVector::derive`] for callers that already bound `level`.
    pub(crate) fn derive_unchecked(code: u64, level: u8) -> Self {
        debug_assert!(level <= MAX_LEVEL);

        let segments = 1usize << level;
        let segment_bits = CODE_BITS >> level;
        let mask = if segment_bits == CODE_BITS {
            u64::MAX
        } else {
            (1u64 << segment_bits) - 1
        };

        let mut weights = [0u8; CODE_BITS];
        for (i, slot) in weights.iter_mut().take(segments).enumerate() {
            let shift = CODE_BITS - (i + 1) * segment_bits;
            *slot = ((code >> shift) & mask).count_ones() as u8;
        }
        Self { weights }
    }

    /// Sum of absolute per-slot differences.
    #[inline]
    pub fn l1_distance(&self, other: &WeightVector) -> u32 {
        self.weights
            .iter()
            .zip(other.weights.iter())
            .map(|(&a, &b)| u32::from(a.abs_diff(b)))
            .sum()
    }

    /// Number of populated slots at `level`.
    #[inline]
    pub fn populated(level: u8) -> usize {
        1usize << level.min(MAX_LEVEL)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.weights
    }

    /// Total of all weights, i.e. the popcount of the source code.
    #[inline]
    pub fn total(&self) -> u32 {
        self.weights.iter().map(|&w| u32::from(w)).sum()
    }
}

impl std::fmt::Debug for WeightVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Trailing zero slots are noise; print up to the last populated one.
        let end = self
            .weights
            .iter()
            .rposition(|&w| w != 0)
            .map_or(1, |i| i + 1);
        f.debug_list().entries(&self.weights[..end]).finish()
    }
}
