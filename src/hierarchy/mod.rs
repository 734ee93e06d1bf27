//! Hierarchy layer — tree construction from flat items, queries, export.

pub mod builder;
pub mod export;
pub mod tree;

pub use builder::{
    build_hierarchy, BuildOutcome, BuildReport, DuplicateKey, DuplicatePolicy, HierarchyBuilder,
};
pub use tree::{DepthFirst, Hierarchy, NodeId, NodeRef};
