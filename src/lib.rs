//! tracegraph — packaging hierarchy reconstruction.
//!
//! Turns flat traversal results from a product-traceability graph (items
//! inside cases inside pallets, recursively) into a rooted tree and answers
//! structural queries over it.

pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod snapshot;
pub mod types;
