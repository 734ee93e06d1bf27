//! Buffered traversal results.
//!
//! A snapshot is one fully materialized query result: every type-definition
//! node plus the `(parent key, node)` rows of a traversal such as
//! `MATCH p = (:Item {DbKey: $key})-[r*0..]->(x) RETURN startNode(last(r)).DbKey, x`.
//! The hierarchy pipeline only ever reads complete snapshots.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::RawNode;

/// One traversal row: a node and the key of its nearest traversed ancestor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalRow {
    #[serde(default, rename = "parent")]
    pub parent_key: Option<String>,
    pub item: RawNode,
}

impl TraversalRow {
    pub fn new(item: RawNode, parent_key: Option<&str>) -> Self {
        Self {
            parent_key: parent_key.map(str::to_string),
            item,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Type-definition nodes (`DbKey`, `Id`, `Ntin`).
    #[serde(default)]
    pub types: Vec<RawNode>,
    #[serde(default)]
    pub rows: Vec<TraversalRow>,
}

impl Snapshot {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let snapshot = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            types = snapshot.types.len(),
            rows = snapshot.rows.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rows whose node carries `db_key`.
    pub fn rows_for_key<'a>(&'a self, db_key: &'a str) -> impl Iterator<Item = &'a TraversalRow> {
        self.rows
            .iter()
            .filter(move |row| row.item.db_key() == Some(db_key))
    }
}
