//! Crate-wide error type.
//!
//! Data-integrity failures (`UnknownTypeCode`, `DuplicateKeyConflict`, ...)
//! are kept apart from plumbing failures (I/O, JSON, YAML) so callers can
//! decide per variant whether to skip a record or abort a batch.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceGraphError {
    /// The type prefix of a composite key has no entry in the type table.
    #[error("unknown type code '{code}' in composite key '{key}'")]
    UnknownTypeCode { code: String, key: String },

    /// The composite key is too short to carry a type prefix.
    #[error("malformed composite key '{key}': expected at least {prefix_len} characters")]
    MalformedCompositeKey { key: String, prefix_len: usize },

    /// A raw node property is missing or has the wrong shape.
    #[error("node {node_id}: invalid property '{property}': {reason}")]
    InvalidProperty {
        node_id: i64,
        property: String,
        reason: String,
    },

    /// Two type definitions share the same type code.
    #[error("duplicate type code '{0}' in type definitions")]
    DuplicateTypeCode(String),

    /// Two items in one build share the same composite key.
    #[error("duplicate composite key '{key}' (nodes {first_node_id} and {second_node_id})")]
    DuplicateKeyConflict {
        key: String,
        first_node_id: i64,
        second_node_id: i64,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TraceGraphError {
    /// True for errors describing bad input data rather than bad plumbing.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownTypeCode { .. }
                | Self::MalformedCompositeKey { .. }
                | Self::InvalidProperty { .. }
                | Self::DuplicateTypeCode(_)
                | Self::DuplicateKeyConflict { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TraceGraphError>;
