//! Raw node → [`Item`] normalization.

use std::collections::BTreeMap;

use crate::error::{Result, TraceGraphError};
use crate::normalize::table::TypeTable;
use crate::types::{Item, ItemKeys, RawNode, PROP_DB_KEY, PROP_KIND, PROP_SEQUENCE};

/// Normalize one traversal result row.
///
/// `parent_key` is the composite key of the nearest ancestor reached by the
/// traversal, or `None` for a traversal root. An empty string counts as
/// `None`. Both keys go through the same fallible decomposition, so a
/// record either normalizes completely or fails without producing an item.
pub fn normalize(raw: &RawNode, parent_key: Option<&str>, table: &TypeTable) -> Result<Item> {
    let db_key = raw.db_key().ok_or_else(|| TraceGraphError::InvalidProperty {
        node_id: raw.id,
        property: PROP_DB_KEY.to_string(),
        reason: "missing or not a string".to_string(),
    })?;

    let own = table.decompose(db_key)?;
    let parent_key = parent_key.filter(|k| !k.is_empty());
    let parent = parent_key.map(|k| table.decompose(k)).transpose()?;

    Ok(Item {
        type_id: own.type_id,
        serial: own.serial,
        sequence: small_int(raw, PROP_SEQUENCE)?,
        kind: small_int(raw, PROP_KIND)?,
        parent,
        keys: ItemKeys {
            db_key: db_key.to_string(),
            parent_db_key: parent_key.map(str::to_string),
            node_id: raw.id,
        },
        extra: extra_strings(raw),
    })
}

fn small_int(raw: &RawNode, property: &str) -> Result<Option<i32>> {
    let value = match raw.property(property) {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(v) => v,
    };
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| TraceGraphError::InvalidProperty {
            node_id: raw.id,
            property: property.to_string(),
            reason: format!("expected a small integer, got {value}"),
        })
}

/// String-valued properties other than the ones already mapped to fields.
fn extra_strings(raw: &RawNode) -> BTreeMap<String, String> {
    raw.properties
        .iter()
        .filter(|(name, _)| !matches!(name.as_str(), PROP_DB_KEY | PROP_SEQUENCE | PROP_KIND))
        .filter_map(|(name, value)| value.as_str().map(|s| (name.clone(), s.to_string())))
        .collect()
}
