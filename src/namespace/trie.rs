//! Segment trie used to detect overlapping publish namespaces.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::RelativeUrlEntry;

/// How two namespaces collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Both sequences are equal.
    Exact,
    /// An existing entry is a strict prefix of the new one.
    Ancestor,
    /// The new entry is a strict prefix of an existing one.
    Descendant,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "duplicate",
            Self::Ancestor => "nested inside an existing namespace",
            Self::Descendant => "contains an existing namespace",
        };
        f.write_str(name)
    }
}

/// A rejected namespace insertion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Relative url '{url}' conflicts with existing relative_url of '{existing_url}' from repo '{existing_repo_id}'"
)]
pub struct ConflictError {
    pub kind: ConflictKind,
    pub repo_id: String,
    pub url: String,
    pub existing_repo_id: String,
    pub existing_url: String,
}

/// Repository claiming a trie node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub repo_id: String,
    pub url: String,
}

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    leaf: Option<Leaf>,
}

impl Node {
    /// First leaf strictly below this node, in segment order.
    fn first_leaf_below(&self) -> Option<&Leaf> {
        self.children
            .values()
            .find_map(|child| child.leaf.as_ref().or_else(|| child.first_leaf_below()))
    }

    fn count_leaves(&self) -> usize {
        usize::from(self.leaf.is_some())
            + self.children.values().map(Node::count_leaves).sum::<usize>()
    }
}

/// Conflict-checked namespace of sibling repositories.
///
/// Every insertion walks only its own segments, so building the trie for
/// `n` repositories costs O(total segments) rather than O(n²) pairwise
/// prefix checks.
#[derive(Debug, Default)]
pub struct NamespaceTrie {
    root: Node,
}

impl NamespaceTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from entries, failing on the first conflict.
    pub fn build<I>(entries: I) -> Result<Self, ConflictError>
    where
        I: IntoIterator<Item = RelativeUrlEntry>,
    {
        let mut trie = Self::new();
        for entry in entries {
            trie.insert(&entry)?;
        }
        Ok(trie)
    }

    /// Claim the entry's segments, or report which repository already owns
    /// an overlapping namespace.
    pub fn insert(&mut self, entry: &RelativeUrlEntry) -> Result<(), ConflictError> {
        let mut node = &mut self.root;
        for segment in &entry.segments {
            if let Some(existing) = &node.leaf {
                return Err(conflict(ConflictKind::Ancestor, entry, existing));
            }
            node = node.children.entry(segment.clone()).or_default();
        }

        if let Some(existing) = &node.leaf {
            return Err(conflict(ConflictKind::Exact, entry, existing));
        }
        if let Some(existing) = node.first_leaf_below() {
            return Err(conflict(ConflictKind::Descendant, entry, existing));
        }

        node.leaf = Some(Leaf {
            repo_id: entry.repo_id.clone(),
            url: entry.url.clone(),
        });
        Ok(())
    }

    /// Repository owning exactly these segments.
    pub fn get(&self, segments: &[String]) -> Option<&Leaf> {
        let mut node = &self.root;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        node.leaf.as_ref()
    }

    /// Number of claimed namespaces.
    pub fn len(&self) -> usize {
        self.root.count_leaves()
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }
}

fn conflict(kind: ConflictKind, entry: &RelativeUrlEntry, existing: &Leaf) -> ConflictError {
    ConflictError {
        kind,
        repo_id: entry.repo_id.clone(),
        url: entry.url.clone(),
        existing_repo_id: existing.repo_id.clone(),
        existing_url: existing.url.clone(),
    }
}
