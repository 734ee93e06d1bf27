//! Arena-backed hierarchy tree and its read-only queries.
//!
//! Nodes live in one `Vec`; slot 0 is the synthetic root, which wraps no
//! item. Children are stored as index lists in attachment order and there
//! are no parent back-references. All walks use an explicit stack, so
//! arbitrarily deep containment chains never recurse.

use std::collections::{BTreeMap, HashMap};

use crate::types::{Item, TypeId};

/// Index of a node inside a [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) item: Option<Item>,
    pub(crate) children: Vec<NodeId>,
}

/// A rooted packaging hierarchy.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub(crate) slots: Vec<Slot>,
    pub(crate) index: HashMap<String, NodeId>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self {
            slots: vec![Slot {
                item: None,
                children: Vec::new(),
            }],
            index: HashMap::new(),
        }
    }
}

impl Hierarchy {
    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId::ROOT)
    }

    /// Panics if `id` did not come from this hierarchy.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.slots.len(), "node id {} out of range", id.0);
        NodeRef { tree: self, id }
    }

    /// Number of items (the synthetic root is not counted).
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a node by its item's composite key.
    pub fn find(&self, db_key: &str) -> Option<NodeRef<'_>> {
        self.index.get(db_key).map(|&id| self.node(id))
    }

    /// Depth-first, pre-order walk of every item in attachment order.
    pub fn walk(&self) -> DepthFirst<'_> {
        self.root().walk()
    }

    /// Reorder every child list with `compare`.
    pub fn sort_children_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Item, &Item) -> std::cmp::Ordering,
    {
        for idx in 0..self.slots.len() {
            let mut children = std::mem::take(&mut self.slots[idx].children);
            children.sort_by(|a, b| match (self.item(*a), self.item(*b)) {
                (Some(a), Some(b)) => compare(a, b),
                _ => std::cmp::Ordering::Equal,
            });
            self.slots[idx].children = children;
        }
    }

    /// Sort every child list by composite key.
    pub fn sort_children(&mut self) {
        self.sort_children_by(|a, b| a.db_key().cmp(b.db_key()));
    }

    fn item(&self, id: NodeId) -> Option<&Item> {
        self.slots[id.0].item.as_ref()
    }
}

/// Borrowed view of one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Hierarchy,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// `None` only for the synthetic root.
    pub fn item(&self) -> Option<&'a Item> {
        self.tree.slots[self.id.0].item.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }

    pub fn child_count(&self) -> usize {
        self.child_ids().len()
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        self.child_ids().iter().map(move |&id| NodeRef { tree, id })
    }

    fn child_ids(&self) -> &'a [NodeId] {
        &self.tree.slots[self.id.0].children
    }

    /// Number of nodes below this one at any depth, excluding itself.
    ///
    /// For the root this is the total number of items in the tree.
    pub fn count_descendants(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<NodeId> = self.child_ids().to_vec();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.tree.slots[id.0].children);
        }
        count
    }

    /// Length of the longest downward path; 0 for a leaf.
    pub fn height(&self) -> usize {
        self.walk().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Descendant counts grouped by item type.
    pub fn count_by_type(&self) -> BTreeMap<TypeId, usize> {
        let mut counts = BTreeMap::new();
        for (_, node) in self.walk() {
            if let Some(item) = node.item() {
                *counts.entry(item.type_id).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Pre-order walk of the descendants, yielding `(depth, node)` with
    /// direct children at depth 1.
    pub fn walk(&self) -> DepthFirst<'a> {
        DepthFirst {
            tree: self.tree,
            stack: self.child_ids().iter().rev().map(|&id| (1, id)).collect(),
        }
    }
}

/// Iterator returned by [`NodeRef::walk`].
pub struct DepthFirst<'a> {
    tree: &'a Hierarchy,
    stack: Vec<(usize, NodeId)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (usize, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.stack.pop()?;
        let children = &self.tree.slots[id.0].children;
        self.stack
            .extend(children.iter().rev().map(|&child| (depth + 1, child)));
        Some((depth, NodeRef { tree: self.tree, id }))
    }
}
