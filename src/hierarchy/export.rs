//! Flat depth-first export of a hierarchy.

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::hierarchy::tree::{Hierarchy, NodeRef};
use crate::normalize::TypeTable;
use crate::types::TypeId;

/// One exported node, in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub depth: usize,
    pub db_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_db_key: Option<String>,
    pub type_id: TypeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    pub serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<i32>,
    pub node_id: i64,
    pub descendants: usize,
}

/// Rows for every descendant of `node`, depth-first in attachment order.
///
/// `types` resolves display codes when given.
pub fn export_rows(node: NodeRef<'_>, types: Option<&TypeTable>) -> Vec<ExportRow> {
    node.walk()
        .filter_map(|(depth, n)| {
            let item = n.item()?;
            Some(ExportRow {
                depth,
                db_key: item.keys.db_key.clone(),
                parent_db_key: item.keys.parent_db_key.clone(),
                type_id: item.type_id,
                type_code: types
                    .and_then(|t| t.by_id(item.type_id))
                    .map(|def| def.display_code.clone()),
                serial: item.serial.clone(),
                sequence: item.sequence,
                kind: item.kind,
                node_id: item.keys.node_id,
                descendants: n.count_descendants(),
            })
        })
        .collect()
}

/// Write the whole hierarchy as a pretty JSON array.
pub fn write_json<W: Write>(
    hierarchy: &Hierarchy,
    types: Option<&TypeTable>,
    writer: W,
) -> Result<()> {
    let rows = export_rows(hierarchy.root(), types);
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}

/// Indented text outline, one item per line.
pub fn render_outline(hierarchy: &Hierarchy) -> String {
    let mut out = String::new();
    for (depth, node) in hierarchy.walk() {
        if let Some(item) = node.item() {
            let children = node.child_count();
            out.push_str(&"  ".repeat(depth - 1));
            out.push_str(item.db_key());
            if children > 0 {
                out.push_str(&format!(" ({} descendants)", node.count_descendants()));
            }
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_hierarchy;
    use crate::normalize::normalize;
    use crate::types::{RawNode, TypeDefinition, PROP_DB_KEY};
    use pretty_assertions::assert_eq;

    fn sample() -> (Hierarchy, TypeTable) {
        let table = TypeTable::load([TypeDefinition::new("ABCD1234", 1, "0501")]).unwrap();
        let rows = [
            ("ABCD1234P", None, 1),
            ("ABCD1234C1", Some("ABCD1234P"), 2),
            ("ABCD1234C2", Some("ABCD1234P"), 3),
        ];
        let items = rows
            .iter()
            .map(|(key, parent, id)| {
                normalize(&RawNode::new(*id).with(PROP_DB_KEY, *key), *parent, &table).unwrap()
            })
            .collect::<Vec<_>>();
        (build_hierarchy(items).hierarchy, table)
    }

    #[test]
    fn rows_carry_depth_and_counts() {
        let (tree, table) = sample();
        let rows = export_rows(tree.root(), Some(&table));
        let summary: Vec<(usize, &str, usize)> = rows
            .iter()
            .map(|r| (r.depth, r.db_key.as_str(), r.descendants))
            .collect();
        assert_eq!(
            summary,
            vec![(1, "ABCD1234P", 2), (2, "ABCD1234C1", 0), (2, "ABCD1234C2", 0)]
        );
        assert_eq!(rows[0].type_code.as_deref(), Some("0501"));
        assert_eq!(rows[1].parent_db_key.as_deref(), Some("ABCD1234P"));
    }

    #[test]
    fn json_export_is_an_array() {
        let (tree, _) = sample();
        let mut buf = Vec::new();
        write_json(&tree, None, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].get("type_code").is_none());
        assert_eq!(rows[2]["serial"], "C2");
    }

    #[test]
    fn outline_indents_children() {
        let (tree, _) = sample();
        assert_eq!(
            render_outline(&tree),
            "ABCD1234P (2 descendants)\n  ABCD1234C1\n  ABCD1234C2\n"
        );
    }
}
