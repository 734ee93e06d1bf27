//! Core domain types for tracegraph.
//!
//! Raw graph nodes come in as untyped property bags ([`RawNode`]); the
//! normalizer turns them into [`Item`]s, which are what the hierarchy
//! builder works on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Property names
// ---------------------------------------------------------------------------

/// Composite key property (`<type prefix><serial>`).
pub const PROP_DB_KEY: &str = "DbKey";
/// Optional small-integer sequence attribute.
pub const PROP_SEQUENCE: &str = "Sequence";
/// Optional small-integer kind attribute.
pub const PROP_KIND: &str = "Kind";
/// Numeric identifier on a type-definition node.
pub const PROP_TYPE_ID: &str = "Id";
/// Display code on a type-definition node.
pub const PROP_DISPLAY_CODE: &str = "Ntin";

/// Length of the type-code prefix in a composite key.
pub const DEFAULT_PREFIX_LEN: usize = 8;

// ---------------------------------------------------------------------------
// TypeId / TypeDefinition
// ---------------------------------------------------------------------------

/// Compact numeric identifier of a product/container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub i32);

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the type definition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type-code string, i.e. the composite-key prefix used for lookup.
    pub code: String,
    pub id: TypeId,
    /// Human-facing code (e.g. an NTIN).
    pub display_code: String,
}

impl TypeDefinition {
    pub fn new(code: impl Into<String>, id: i32, display_code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            id: TypeId(id),
            display_code: display_code.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RawNode
// ---------------------------------------------------------------------------

/// A graph node as returned by a traversal query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Database-internal node identifier.
    pub id: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl RawNode {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(name.to_string(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&serde_json::Value> {
        self.properties.get(name)
    }

    /// The composite key, if present and a string.
    pub fn db_key(&self) -> Option<&str> {
        self.property(PROP_DB_KEY).and_then(|v| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A decomposed composite key: type identifier plus serial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub type_id: TypeId,
    pub serial: String,
}

/// Identity fields the hierarchy builder and exporters rely on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemKeys {
    /// The item's own composite key, as stored in the database.
    pub db_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_db_key: Option<String>,
    /// Database-internal node identifier.
    pub node_id: i64,
}

/// A normalized traceability item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub type_id: TypeId,
    pub serial: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<i32>,
    /// Decomposed parent key; `None` for traversal roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemRef>,
    pub keys: ItemKeys,
    /// Remaining string properties, carried for export only.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Item {
    pub fn db_key(&self) -> &str {
        &self.keys.db_key
    }

    pub fn parent_db_key(&self) -> Option<&str> {
        self.keys.parent_db_key.as_deref()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_node_builder_sets_properties() {
        let node = RawNode::new(7).with(PROP_DB_KEY, "ABCD1234X1").with(PROP_KIND, 2);
        assert_eq!(node.db_key(), Some("ABCD1234X1"));
        assert_eq!(node.property(PROP_KIND).and_then(|v| v.as_i64()), Some(2));
        assert!(node.property(PROP_SEQUENCE).is_none());
    }

    #[test]
    fn raw_node_db_key_requires_string() {
        let node = RawNode::new(1).with(PROP_DB_KEY, 42);
        assert_eq!(node.db_key(), None);
    }

    #[test]
    fn raw_node_deserializes_without_labels() {
        let json = r#"{"id": 3, "properties": {"DbKey": "ABCD1234X1"}}"#;
        let node: RawNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, 3);
        assert!(node.labels.is_empty());
        assert_eq!(node.db_key(), Some("ABCD1234X1"));
    }

    #[test]
    fn type_id_serializes_transparently() {
        let json = serde_json::to_string(&TypeId(12)).unwrap();
        assert_eq!(json, "12");
    }

    #[test]
    fn item_json_omits_absent_parent() {
        let item = Item {
            type_id: TypeId(1),
            serial: "X1".into(),
            sequence: None,
            kind: None,
            parent: None,
            keys: ItemKeys {
                db_key: "ABCD1234X1".into(),
                parent_db_key: None,
                node_id: 1,
            },
            extra: BTreeMap::new(),
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("parent").is_none());
        assert!(value["keys"].get("parent_db_key").is_none());
        assert_eq!(value["serial"], "X1");
    }
}
