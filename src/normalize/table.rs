//! The type definition table.
//!
//! Loaded once per session from the full set of type-definition nodes and
//! read-only afterwards. Every normalization call borrows it; there is no
//! process-wide instance.

use std::collections::HashMap;

use crate::error::{Result, TraceGraphError};
use crate::normalize::key::split_composite_key;
use crate::types::{
    ItemRef, RawNode, TypeDefinition, TypeId, DEFAULT_PREFIX_LEN, PROP_DB_KEY,
    PROP_DISPLAY_CODE, PROP_TYPE_ID,
};

/// Lookup table from type-code string to [`TypeDefinition`].
#[derive(Debug, Clone)]
pub struct TypeTable {
    by_code: HashMap<String, TypeDefinition>,
    prefix_len: usize,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::empty(DEFAULT_PREFIX_LEN)
    }
}

impl TypeTable {
    /// An empty table for keys with a `prefix_len`-character type code.
    pub fn empty(prefix_len: usize) -> Self {
        Self {
            by_code: HashMap::new(),
            prefix_len,
        }
    }

    /// Load `(code, id, display code)` definitions. A repeated type code is
    /// rejected rather than overwritten.
    pub fn load<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = TypeDefinition>,
    {
        Self::load_with_prefix_len(definitions, DEFAULT_PREFIX_LEN)
    }

    pub fn load_with_prefix_len<I>(definitions: I, prefix_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = TypeDefinition>,
    {
        let mut table = Self::empty(prefix_len);
        for def in definitions {
            table.insert(def)?;
        }
        Ok(table)
    }

    /// Load from raw type-definition nodes carrying `DbKey`, `Id` and `Ntin`.
    pub fn from_nodes<'a, I>(nodes: I, prefix_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'a RawNode>,
    {
        let mut table = Self::empty(prefix_len);
        for node in nodes {
            table.insert(definition_from_node(node)?)?;
        }
        tracing::debug!(types = table.len(), "type definitions loaded");
        Ok(table)
    }

    fn insert(&mut self, def: TypeDefinition) -> Result<()> {
        if self.by_code.contains_key(&def.code) {
            return Err(TraceGraphError::DuplicateTypeCode(def.code));
        }
        self.by_code.insert(def.code.clone(), def);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    pub fn get(&self, code: &str) -> Option<&TypeDefinition> {
        self.by_code.get(code)
    }

    /// Reverse lookup by numeric id. Linear; meant for display paths.
    pub fn by_id(&self, id: TypeId) -> Option<&TypeDefinition> {
        self.by_code.values().find(|def| def.id == id)
    }

    /// Definitions sorted by type id.
    pub fn definitions(&self) -> Vec<&TypeDefinition> {
        let mut defs: Vec<_> = self.by_code.values().collect();
        defs.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.code.cmp(&b.code)));
        defs
    }

    /// Split a composite key and resolve its prefix.
    pub fn decompose(&self, key: &str) -> Result<ItemRef> {
        let (code, serial) = split_composite_key(key, self.prefix_len)?;
        let def = self
            .get(code)
            .ok_or_else(|| TraceGraphError::UnknownTypeCode {
                code: code.to_string(),
                key: key.to_string(),
            })?;
        Ok(ItemRef {
            type_id: def.id,
            serial: serial.to_string(),
        })
    }
}

fn definition_from_node(node: &RawNode) -> Result<TypeDefinition> {
    let code = node
        .property(PROP_DB_KEY)
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid(node, PROP_DB_KEY, "expected a string"))?;
    let id = node
        .property(PROP_TYPE_ID)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| invalid(node, PROP_TYPE_ID, "expected an integer"))?;
    let id = i32::try_from(id).map_err(|_| invalid(node, PROP_TYPE_ID, "out of range"))?;
    // Some exports omit the display code; fall back to the type code.
    let display = node
        .property(PROP_DISPLAY_CODE)
        .and_then(|v| v.as_str())
        .unwrap_or(code);
    Ok(TypeDefinition::new(code, id, display))
}

fn invalid(node: &RawNode, property: &str, reason: &str) -> TraceGraphError {
    TraceGraphError::InvalidProperty {
        node_id: node.id,
        property: property.to_string(),
        reason: reason.to_string(),
    }
}
