use thiserror::Error;

/// Errors reported by fallible constructors and derivations.
///
/// Tree operations themselves are total; only configuration and explicit
/// weight-vector derivation can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HwtError {
    #[error("partition level {level} out of range (max {max})")]
    LevelOutOfRange { level: u8, max: u8 },
    #[error("leaf capacity must be at least 1")]
    InvalidLeafCapacity,
    #[error("max depth {depth} exceeds the deepest partition level {max}")]
    InvalidMaxDepth { depth: u8, max: u8 },
}
