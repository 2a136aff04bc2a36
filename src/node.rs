//! Tree nodes.
//!
//! A node is either a leaf holding entries directly, or an internal node
//! holding children keyed by the weight vector of their entries at the
//! internal node's level:
//!
//! - Leaf: up to `leaf_capacity` entries (more only at max depth)
//! - Internal: `WeightVector -> Node` map, one child per distinct key
//!
//! A leaf that outgrows its capacity is promoted: its entries are bucketed
//! into fresh child leaves under a new internal node, which replaces it.
//! Nodes are never demoted.

use std::collections::HashMap;
use std::mem::size_of;

use smallvec::SmallVec;
use tracing::trace;

use crate::config::{Config, LEAF_CAPACITY};
use crate::entry::Entry;
use crate::metrics::OpCounters;
use crate::weights::WeightVector;

/// Leaf storage; inline up to one past the default capacity, the size a leaf
/// reaches just before promotion.
pub(crate) type LeafEntries = SmallVec<[Entry; LEAF_CAPACITY + 1]>;

/// The kind of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Buckets children by weight vector.
    Internal,
    /// Stores entries.
    Leaf,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Internal => f.write_str("internal"),
            NodeKind::Leaf => f.write_str("leaf"),
        }
    }
}

#[derive(Clone)]
pub(crate) enum Node {
    Internal(InternalNode),
    Leaf(LeafNode),
}

impl Node {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Internal(_) => NodeKind::Internal,
            Node::Leaf(_) => NodeKind::Leaf,
        }
    }

    /// A leaf with no entries, or an internal node with no children.
    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Node::Internal(internal) => internal.is_empty(),
            Node::Leaf(leaf) => leaf.is_empty(),
        }
    }

    /// Approximate heap footprint of this node alone, excluding children.
    pub(crate) fn bytes_used(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.bytes_used(),
            Node::Leaf(leaf) => leaf.bytes_used(),
        }
    }
}

// =============================================================================
// Leaf
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct LeafNode {
    entries: LeafEntries,
}

impl LeafNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_entry(entry: Entry) -> Self {
        let mut leaf = Self::new();
        leaf.entries.push(entry);
        leaf
    }

    /// Appends without considering capacity.
    #[inline]
    pub(crate) fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Appends `entry` to a leaf sitting at `level`.
    ///
    /// Returns the internal node that must replace this leaf when the append
    /// pushed it past capacity and `level` still allows partitioning. The
    /// leaf is left empty in that case; all of its entries move to the
    /// replacement's children.
    pub(crate) fn insert(
        &mut self,
        entry: Entry,
        level: u8,
        config: &Config,
        counters: &mut OpCounters,
    ) -> Option<InternalNode> {
        self.entries.push(entry);
        if self.entries.len() <= config.leaf_capacity {
            return None;
        }
        if level >= config.max_depth {
            trace!(depth = level, entries = self.entries.len(), "leaf over capacity at max depth");
            return None;
        }

        trace!(depth = level, entries = self.entries.len(), "promoting leaf");
        let entries = std::mem::take(&mut self.entries);
        Some(InternalNode::from_entries(entries, level, counters))
    }

    /// Removes the entry with the same id and code, if present.
    ///
    /// Removal swaps the last entry into the vacated slot.
    pub(crate) fn remove(&mut self, entry: &Entry) -> Option<Entry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.distance(entry) == 0 && e.id == entry.id)?;
        Some(self.entries.swap_remove(pos))
    }

    /// Pushes every entry within Hamming distance `radius` of `target` onto
    /// `results`.
    pub(crate) fn select_entries(
        &self,
        target: u64,
        radius: u32,
        results: &mut Vec<Entry>,
        counters: &mut OpCounters,
    ) {
        for e in &self.entries {
            if e.counted_distance_to(target, counters) <= radius {
                results.push(*e);
            }
        }
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn bytes_used(&self) -> usize {
        self.entries.capacity() * size_of::<Entry>()
    }
}

// =============================================================================
// Internal
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct InternalNode {
    children: HashMap<WeightVector, Box<Node>>,
}

impl InternalNode {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Builds the replacement for a promoted leaf at `level`.
    ///
    /// Entries are bucketed by their weight vector at `level` into new child
    /// leaves. Only one level is fanned out: a child that received more than
    /// `leaf_capacity` entries is split on its next insert.
    pub(crate) fn from_entries(entries: LeafEntries, level: u8, counters: &mut OpCounters) -> Self {
        let mut internal = Self::new();
        internal.add_entries(entries, level, counters);
        internal
    }

    /// Distributes `entries` into child leaves keyed by their weights at
    /// `level`. Only used on a node built during promotion, whose children
    /// are all leaves.
    fn add_entries(&mut self, entries: LeafEntries, level: u8, counters: &mut OpCounters) {
        let mut buckets: HashMap<WeightVector, LeafNode> = HashMap::new();
        for e in entries {
            counters.build_ops += 1;
            let weights = WeightVector::derive_unchecked(e.code, level);
            buckets.entry(weights).or_default().push(e);
        }
        for (weights, leaf) in buckets {
            self.set_child_node(weights, Node::Leaf(leaf));
        }
    }

    /// Child to continue an insert into, created as an empty leaf if this
    /// node has none for `weights`.
    pub(crate) fn add_entry(&mut self, weights: WeightVector) -> &mut Node {
        self.children
            .entry(weights)
            .or_insert_with(|| Box::new(Node::Leaf(LeafNode::new())))
    }

    /// Child to continue a delete into. Never creates a child.
    pub(crate) fn del_entry(&mut self, weights: &WeightVector) -> Option<&mut Node> {
        self.children.get_mut(weights).map(|child| &mut **child)
    }

    /// Pushes every child whose key is within L1 distance `radius` of
    /// `target` onto `next`.
    pub(crate) fn select_child_nodes<'a>(
        &'a self,
        target: &WeightVector,
        radius: u32,
        next: &mut Vec<&'a Node>,
        counters: &mut OpCounters,
    ) {
        for (key, child) in &self.children {
            counters.prune_ops += 1;
            if key.l1_distance(target) <= radius {
                next.push(&**child);
            }
        }
    }

    /// Replaces the child under `key`, returning the previous one.
    pub(crate) fn set_child_node(&mut self, key: WeightVector, node: Node) -> Option<Box<Node>> {
        self.children.insert(key, Box::new(node))
    }

    pub(crate) fn unset_child_node(&mut self, key: &WeightVector) -> Option<Box<Node>> {
        self.children.remove(key)
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = (&WeightVector, &Node)> {
        self.children.iter().map(|(k, v)| (k, &**v))
    }

    /// Moves every child out, leaving this node empty.
    pub(crate) fn take_children(&mut self) -> impl Iterator<Item = Box<Node>> {
        std::mem::take(&mut self.children).into_values()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn bytes_used(&self) -> usize {
        // Map slots, one boxed node per child, plus the bucket table.
        let elem = size_of::<(WeightVector, Box<Node>)>() + size_of::<Node>();
        self.children.len() * elem + self.children.capacity() * size_of::<usize>()
    }
}
