use crate::error::HwtError;
use crate::weights::MAX_LEVEL;

/// Default number of entries a leaf holds before it is promoted.
pub const LEAF_CAPACITY: usize = 10;

/// Configuration for an [`HwTree`](crate::HwTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Entries a leaf may hold before it is split into an internal node.
    pub leaf_capacity: usize,
    /// Deepest level at which a leaf may still be promoted is `max_depth - 1`;
    /// leaves at `max_depth` grow without bound.
    pub max_depth: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            leaf_capacity: LEAF_CAPACITY,
            max_depth: MAX_LEVEL,
        }
    }
}

impl Config {
    pub fn leaf_capacity(mut self, leaf_capacity: usize) -> Self {
        self.leaf_capacity = leaf_capacity;
        self
    }

    pub fn max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<(), HwtError> {
        if self.leaf_capacity == 0 {
            return Err(HwtError::InvalidLeafCapacity);
        }
        if self.max_depth > MAX_LEVEL {
            return Err(HwtError::InvalidMaxDepth {
                depth: self.max_depth,
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }
}
