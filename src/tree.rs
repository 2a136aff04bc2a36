//! The tree orchestrator: owns the root and drives level-by-level descent.

use std::collections::VecDeque;
use std::mem::size_of;

use tracing::debug;

use crate::config::Config;
use crate::entry::Entry;
use crate::error::HwtError;
use crate::metrics::OpCounters;
use crate::node::{LeafNode, Node, NodeKind};
use crate::weights::{WeightVector, MAX_LEVEL};

/// Structural statistics for a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of stored entries
    pub entries: usize,
    /// Number of leaf nodes
    pub leaf_nodes: usize,
    /// Number of internal nodes
    pub internal_nodes: usize,
    /// Level of the deepest node (0 for a lone root)
    pub depth: u8,
    /// Largest entry count held by a single leaf
    pub max_leaf_entries: usize,
    /// Same figure as [`HwTree::memory_usage`]
    pub bytes: usize,
}

/// A Hamming weight tree over 64-bit codes.
///
/// Entries are bucketed level by level by the weight vectors of their codes.
/// Range search prunes whole subtrees whose weight vector lies further than
/// the radius from the query's, which never drops a true match.
///
/// ```
/// use hwtree::{Entry, HwTree};
///
/// let mut tree = HwTree::new();
/// tree.insert(Entry::new(1, 0x00));
/// tree.insert(Entry::new(2, 0xFF));
/// tree.insert(Entry::new(3, 0x0F));
///
/// let mut found = tree.range_search(0x00, 4);
/// found.sort();
/// assert_eq!(found, vec![Entry::new(1, 0x00), Entry::new(3, 0x0F)]);
/// ```
#[derive(Clone)]
pub struct HwTree {
    pub(crate) root: Option<Box<Node>>,
    pub(crate) config: Config,
}

impl HwTree {
    pub fn new() -> Self {
        Self {
            root: None,
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Result<Self, HwtError> {
        config.validate()?;
        debug!(
            leaf_capacity = config.leaf_capacity,
            max_depth = config.max_depth,
            "creating hwtree"
        );
        Ok(Self { root: None, config })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn insert(&mut self, entry: Entry) {
        self.insert_with_counters(entry, &mut OpCounters::default());
    }

    /// Inserts `entry`, which is stored even if an identical one exists.
    pub fn insert_with_counters(&mut self, entry: Entry, counters: &mut OpCounters) {
        let root = match self.root.as_deref_mut() {
            Some(root) => root,
            None => {
                self.root = Some(Box::new(Node::Leaf(LeafNode::with_entry(entry))));
                return;
            }
        };

        let mut node: &mut Node = root;
        let mut level = 0u8;
        loop {
            match node {
                Node::Internal(internal) => {
                    counters.build_ops += 1;
                    let weights = WeightVector::derive_unchecked(entry.code, level);
                    node = internal.add_entry(weights);
                    level += 1;
                }
                Node::Leaf(leaf) => {
                    // A promoted leaf is swapped for its replacement in the
                    // slot that owns it: the root, or the parent's child map.
                    if let Some(replacement) = leaf.insert(entry, level, &self.config, counters) {
                        *node = Node::Internal(replacement);
                    }
                    return;
                }
            }
        }
    }

    pub fn remove(&mut self, entry: &Entry) -> Option<Entry> {
        self.remove_with_counters(entry, &mut OpCounters::default())
    }

    /// Removes the entry with the same id and code.
    ///
    /// Returns `None`, leaving the tree untouched, if there is no such entry.
    /// Nodes emptied by the removal are unlinked from their parents all the
    /// way up, so an empty tree has no root.
    pub fn remove_with_counters(&mut self, entry: &Entry, counters: &mut OpCounters) -> Option<Entry> {
        let root = self.root.as_deref_mut()?;
        let removed = Self::remove_recursive(root, entry, 0, counters)?;
        if root.is_empty() {
            self.root = None;
        }
        Some(removed)
    }

    fn remove_recursive(
        node: &mut Node,
        entry: &Entry,
        level: u8,
        counters: &mut OpCounters,
    ) -> Option<Entry> {
        match node {
            Node::Leaf(leaf) => leaf.remove(entry),
            Node::Internal(internal) => {
                counters.build_ops += 1;
                let weights = WeightVector::derive_unchecked(entry.code, level);
                let child = internal.del_entry(&weights)?;
                let removed = Self::remove_recursive(child, entry, level + 1, counters)?;
                if child.is_empty() {
                    internal.unset_child_node(&weights);
                }
                Some(removed)
            }
        }
    }

    pub fn range_search(&self, target: u64, radius: u32) -> Vec<Entry> {
        self.range_search_with_counters(target, radius, &mut OpCounters::default())
    }

    /// Every stored entry within Hamming distance `radius` of `target`, in no
    /// particular order.
    ///
    /// Nodes are visited one level at a time; at each level the target's
    /// weight vector for that level decides which children survive into the
    /// next level's working set.
    pub fn range_search_with_counters(
        &self,
        target: u64,
        radius: u32,
        counters: &mut OpCounters,
    ) -> Vec<Entry> {
        let mut results = Vec::new();
        let mut current: Vec<&Node> = self.root.as_deref().into_iter().collect();
        let mut next: Vec<&Node> = Vec::new();

        let mut level = 0u8;
        while !current.is_empty() {
            let target_weights = WeightVector::derive_unchecked(target, level.min(MAX_LEVEL));
            for node in current.drain(..) {
                match node {
                    Node::Leaf(leaf) => leaf.select_entries(target, radius, &mut results, counters),
                    Node::Internal(internal) => {
                        internal.select_child_nodes(&target_weights, radius, &mut next, counters)
                    }
                }
            }
            std::mem::swap(&mut current, &mut next);
            level += 1;
        }
        results
    }

    /// Whether any stored entry has exactly this id and code.
    pub fn contains(&self, entry: &Entry) -> bool {
        self.range_search(entry.code, 0).contains(entry)
    }

    /// Number of stored entries, counted over all leaves.
    pub fn len(&self) -> usize {
        let mut n = 0;
        self.for_each_node(|node, _| {
            if let Node::Leaf(leaf) = node {
                n += leaf.len();
            }
        });
        n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Approximate bytes held by the tree and all of its nodes.
    pub fn memory_usage(&self) -> usize {
        let mut bytes = size_of::<Self>();
        if self.root.is_some() {
            bytes += size_of::<Node>();
        }
        self.for_each_node(|node, _| bytes += node.bytes_used());
        bytes
    }

    /// Releases every node, parents before children. Calling it on an empty
    /// tree does nothing.
    pub fn clear(&mut self) {
        let mut queue: VecDeque<Box<Node>> = self.root.take().into_iter().collect();
        let mut released = 0usize;
        while let Some(mut node) = queue.pop_front() {
            if let Node::Internal(internal) = node.as_mut() {
                queue.extend(internal.take_children());
            }
            drop(node);
            released += 1;
        }
        if released > 0 {
            debug!(released, "cleared hwtree");
        }
    }

    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        self.for_each_node(|node, level| {
            stats.depth = stats.depth.max(level);
            match node {
                Node::Internal(_) => stats.internal_nodes += 1,
                Node::Leaf(leaf) => {
                    stats.leaf_nodes += 1;
                    stats.entries += leaf.len();
                    stats.max_leaf_entries = stats.max_leaf_entries.max(leaf.len());
                }
            }
        });
        stats.bytes = self.memory_usage();
        stats
    }

    /// All stored entries, level by level.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            queue: self.root.as_deref().into_iter().collect(),
            entries: [].iter(),
        }
    }

    /// Breadth-first walk calling `f` with each node and its level.
    pub(crate) fn for_each_node<'a>(&'a self, mut f: impl FnMut(&'a Node, u8)) {
        let mut queue: VecDeque<(&Node, u8)> = VecDeque::new();
        if let Some(root) = self.root.as_deref() {
            queue.push_back((root, 0));
        }
        while let Some((node, level)) = queue.pop_front() {
            f(node, level);
            if let Node::Internal(internal) = node {
                queue.extend(internal.children().map(|(_, child)| (child, level + 1)));
            }
        }
    }

    /// Kind of the root node, if any.
    pub fn root_kind(&self) -> Option<NodeKind> {
        self.root.as_deref().map(Node::kind)
    }
}

impl Default for HwTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Entry> for HwTree {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl FromIterator<Entry> for HwTree {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl std::fmt::Debug for HwTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a HwTree {
    type Item = &'a Entry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    queue: VecDeque<&'a Node>,
    entries: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                return Some(e);
            }
            match self.queue.pop_front()? {
                Node::Leaf(leaf) => self.entries = leaf.entries().iter(),
                Node::Internal(internal) => {
                    self.queue.extend(internal.children().map(|(_, child)| child));
                }
            }
        }
    }
}
