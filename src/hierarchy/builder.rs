//! Two-pass hierarchy construction.
//!
//! 1. Index pass: one node per item, keyed by composite key. Repeated keys
//!    keep the first-seen node and are reported.
//! 2. Attachment pass: each node goes under its parent when the parent key
//!    is indexed, otherwise under the synthetic root.
//!
//! Parent links that loop back on themselves would leave nodes unreachable
//! from the root; those loops are cut after attachment so that every
//! indexed item is counted exactly once.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceGraphError};
use crate::hierarchy::tree::{Hierarchy, NodeId, Slot};
use crate::types::Item;

// ---------------------------------------------------------------------------
// Policy and report types
// ---------------------------------------------------------------------------

/// What to do when two items share a composite key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first-seen item, report the rest.
    #[default]
    KeepFirst,
    /// Fail the build with `DuplicateKeyConflict`.
    Reject,
}

impl DuplicatePolicy {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep-first" | "keep_first" | "keepfirst" | "report" => Some(Self::KeepFirst),
            "reject" | "strict" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// A composite key seen more than once in one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: String,
    pub kept_node_id: i64,
    pub dropped_node_id: i64,
}

/// Anomalies observed while building. None of them abort the build under
/// [`DuplicatePolicy::KeepFirst`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub duplicates: Vec<DuplicateKey>,
    /// Keys of nodes moved under the root to cut a parent loop.
    pub cycle_breaks: Vec<String>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.cycle_breaks.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub hierarchy: Hierarchy,
    pub report: BuildReport,
}

// ---------------------------------------------------------------------------
// HierarchyBuilder
// ---------------------------------------------------------------------------

/// Stateless builder; safe to reuse across item sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyBuilder {
    pub duplicates: DuplicatePolicy,
    /// Sort every child list by composite key after attachment.
    pub sort_children: bool,
}

impl HierarchyBuilder {
    pub fn new(duplicates: DuplicatePolicy) -> Self {
        Self {
            duplicates,
            sort_children: false,
        }
    }

    pub fn sorted(mut self, sort_children: bool) -> Self {
        self.sort_children = sort_children;
        self
    }

    pub fn build<I>(&self, items: I) -> Result<BuildOutcome>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut outcome = build_hierarchy(items);
        if self.duplicates == DuplicatePolicy::Reject {
            if let Some(dup) = outcome.report.duplicates.first() {
                return Err(TraceGraphError::DuplicateKeyConflict {
                    key: dup.key.clone(),
                    first_node_id: dup.kept_node_id,
                    second_node_id: dup.dropped_node_id,
                });
            }
        }
        if self.sort_children {
            outcome.hierarchy.sort_children();
        }
        Ok(outcome)
    }
}

/// Build a hierarchy, keeping the first item for any repeated key.
pub fn build_hierarchy<I>(items: I) -> BuildOutcome
where
    I: IntoIterator<Item = Item>,
{
    let mut tree = Hierarchy::default();
    let mut report = BuildReport::default();

    // Index pass.
    for item in items {
        if let Some(&existing) = tree.index.get(item.db_key()) {
            let kept_node_id = tree.slots[existing.0]
                .item
                .as_ref()
                .map(|i| i.keys.node_id)
                .unwrap_or_default();
            tracing::warn!(
                key = item.db_key(),
                kept_node_id,
                dropped_node_id = item.keys.node_id,
                "duplicate composite key, keeping first-seen item"
            );
            report.duplicates.push(DuplicateKey {
                key: item.keys.db_key.clone(),
                kept_node_id,
                dropped_node_id: item.keys.node_id,
            });
            continue;
        }
        let id = NodeId(tree.slots.len());
        tree.index.insert(item.keys.db_key.clone(), id);
        tree.slots.push(Slot {
            item: Some(item),
            children: Vec::new(),
        });
    }

    // Attachment pass.
    let mut parent_of = vec![NodeId::ROOT; tree.slots.len()];
    for idx in 1..tree.slots.len() {
        let parent = tree.slots[idx]
            .item
            .as_ref()
            .and_then(Item::parent_db_key)
            .and_then(|key| tree.index.get(key).copied())
            .unwrap_or(NodeId::ROOT);
        parent_of[idx] = parent;
        tree.slots[parent.0].children.push(NodeId(idx));
    }

    cut_parent_loops(&mut tree, &mut parent_of, &mut report);

    tracing::debug!(
        items = tree.len(),
        root_children = tree.root().child_count(),
        duplicates = report.duplicates.len(),
        "hierarchy built"
    );
    BuildOutcome {
        hierarchy: tree,
        report,
    }
}

/// Re-home nodes that the root cannot reach.
///
/// An unreachable node always hangs below a loop of parent links. Follow
/// its parent chain until a node repeats, then move the loop member that
/// came first in the input under the root.
fn cut_parent_loops(tree: &mut Hierarchy, parent_of: &mut [NodeId], report: &mut BuildReport) {
    let mut reached = vec![false; tree.slots.len()];
    mark_reachable(tree, NodeId::ROOT, &mut reached);

    for idx in 1..tree.slots.len() {
        if reached[idx] {
            continue;
        }
        let mut on_path = vec![false; tree.slots.len()];
        let mut cur = idx;
        while !on_path[cur] {
            on_path[cur] = true;
            cur = parent_of[cur].0;
        }
        // `cur` is on the loop; pick its earliest member.
        let mut cut = cur;
        let mut walk = parent_of[cur].0;
        while walk != cur {
            cut = cut.min(walk);
            walk = parent_of[walk].0;
        }

        let old_parent = parent_of[cut];
        tree.slots[old_parent.0].children.retain(|&c| c != NodeId(cut));
        tree.slots[0].children.push(NodeId(cut));
        parent_of[cut] = NodeId::ROOT;

        let key = tree.slots[cut]
            .item
            .as_ref()
            .map(|i| i.keys.db_key.clone())
            .unwrap_or_default();
        tracing::warn!(key = %key, "parent links form a loop, attaching under root");
        report.cycle_breaks.push(key);

        mark_reachable(tree, NodeId(cut), &mut reached);
    }
}

fn mark_reachable(tree: &Hierarchy, from: NodeId, reached: &mut [bool]) {
    reached[from.0] = true;
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        for &child in &tree.slots[id.0].children {
            if !reached[child.0] {
                reached[child.0] = true;
                stack.push(child);
            }
        }
    }
}
