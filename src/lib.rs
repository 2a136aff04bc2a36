//! # hwtree
//!
//! A Hamming weight tree: an in-memory index over 64-bit binary codes that
//! answers exact radius queries under Hamming distance.
//!
//! Codes are bucketed level by level by their *weight vectors*, the popcounts
//! of successively finer bit segments (see [`WeightVector`]). The L1 distance
//! between two weight vectors is a lower bound on the Hamming distance between
//! their codes, so a range search can discard every subtree whose key is
//! further than the radius from the query's key without missing a match.
//!
//! ## Example
//!
//! ```rust
//! use hwtree::{Entry, HwTree};
//!
//! let mut tree = HwTree::new();
//! tree.insert(Entry::new(1, 0b0000));
//! tree.insert(Entry::new(2, 0b1111_1111));
//! tree.insert(Entry::new(3, 0b1111));
//!
//! let mut hits = tree.range_search(0, 4);
//! hits.sort();
//! assert_eq!(hits, vec![Entry::new(1, 0), Entry::new(3, 0b1111)]);
//!
//! assert_eq!(tree.remove(&Entry::new(3, 0b1111)), Some(Entry::new(3, 0b1111)));
//! assert_eq!(tree.len(), 2);
//! ```
//!
//! ## Layout
//!
//! - A leaf holds up to [`LEAF_CAPACITY`] entries. One more insert promotes it
//!   to an internal node whose children bucket the entries by weight vector.
//! - Partitioning stops at level [`MAX_LEVEL`], where segments are single
//!   bits; leaves there grow without bound.
//!
//! The tree is single-threaded; wrap it in a lock for shared use.

mod config;
mod debug;
mod entry;
mod error;
mod metrics;
mod node;
mod tree;
mod weights;

pub use config::{Config, LEAF_CAPACITY};
pub use entry::Entry;
pub use error::HwtError;
pub use metrics::OpCounters;
pub use node::NodeKind;
pub use tree::{HwTree, Iter, TreeStats};
pub use weights::{WeightVector, CODE_BITS, MAX_LEVEL};

#[cfg(test)]
mod proptests;
