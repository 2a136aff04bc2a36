//! Debug utilities: a level-by-level dump and an integrity check.

use std::fmt;
use std::io::{self, Write};

use crate::node::Node;
use crate::tree::HwTree;
use crate::weights::WeightVector;

/// Level-by-level rendering shared by [`HwTree::dump`] and
/// [`HwTree::debug_print`].
struct Levels<'a>(&'a HwTree);

impl fmt::Display for Levels<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------HWTree----------------")?;
        let mut current: Vec<&Node> = self.0.root.as_deref().into_iter().collect();
        let mut next: Vec<&Node> = Vec::new();
        let mut level = 0usize;
        while !current.is_empty() {
            for node in current.drain(..) {
                match node {
                    Node::Internal(internal) => {
                        writeln!(f, "({}-{})-{}", node.kind(), level, internal.len())?;
                        next.extend(internal.children().map(|(_, child)| child));
                    }
                    Node::Leaf(leaf) => {
                        writeln!(f, "({}-{})-{}", node.kind(), level, leaf.len())?;
                        for e in leaf.entries() {
                            writeln!(f, "    id = {} code = {:016x}", e.id, e.code)?;
                        }
                    }
                }
            }
            std::mem::swap(&mut current, &mut next);
            level += 1;
        }
        writeln!(f, "------------------------------------")
    }
}

impl HwTree {
    /// Writes every node, level by level.
    ///
    /// Internal nodes are listed with their child count, leaves with their
    /// entry count followed by one line per entry:
    ///
    /// ```text
    /// ------------HWTree----------------
    /// (internal-0)-2
    /// (leaf-1)-1
    ///     id = 7 code = 00000000000000ff
    /// ```
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", Levels(self))
    }

    /// Print the tree structure to stdout.
    pub fn debug_print(&self) {
        print!("{}", Levels(self));
    }

    /// Verify tree integrity - returns list of issues found.
    pub fn verify_integrity(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if let Some(root) = self.root.as_deref() {
            let mut path = Vec::new();
            self.verify_node(root, 0, &mut path, &mut issues);
        }
        issues
    }

    fn verify_node(
        &self,
        node: &Node,
        level: u8,
        path: &mut Vec<WeightVector>,
        issues: &mut Vec<String>,
    ) {
        if node.is_empty() {
            issues.push(format!("empty {} node at level {}", node.kind(), level));
        }

        match node {
            Node::Leaf(leaf) => {
                // Promotion fans out one level at a time, so a leaf at
                // `level` may hold one extra entry per level above it.
                let limit = self.config.leaf_capacity + level as usize;
                if level < self.config.max_depth && leaf.len() > limit {
                    issues.push(format!(
                        "leaf at level {} holds {} entries (limit {})",
                        level,
                        leaf.len(),
                        limit
                    ));
                }
                // Every entry must derive the keys that led here.
                for e in leaf.entries() {
                    for (l, key) in path.iter().enumerate() {
                        if WeightVector::derive_unchecked(e.code, l as u8) != *key {
                            issues.push(format!(
                                "entry id={} code={:016x} filed under wrong key at level {}",
                                e.id, e.code, l
                            ));
                        }
                    }
                }
            }
            Node::Internal(internal) => {
                if level >= self.config.max_depth {
                    issues.push(format!("internal node at level {} beyond max depth", level));
                }
                for (key, child) in internal.children() {
                    path.push(*key);
                    self.verify_node(child, level + 1, path, issues);
                    path.pop();
                }
            }
        }
    }
}
