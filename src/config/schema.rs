//! Configuration data structures for tracegraph.
//!
//! Defines the YAML config format: key layout, hierarchy policies,
//! normalization error handling, and logging. Every section has defaults, so
//! an empty file is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceGraphError};
use crate::hierarchy::DuplicatePolicy;
use crate::types::DEFAULT_PREFIX_LEN;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for tracegraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceGraphConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub keys: KeysConfig,

    #[serde(default)]
    pub hierarchy: HierarchyConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TraceGraphConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            keys: KeysConfig::default(),
            hierarchy: HierarchyConfig::default(),
            normalize: NormalizeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TraceGraphConfig {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.keys.prefix_len == 0 {
            return Err(TraceGraphError::Config(
                "keys.prefix_len must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Composite key layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    /// Number of characters in the type-code prefix.
    #[serde(default = "default_prefix_len")]
    pub prefix_len: usize,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            prefix_len: default_prefix_len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default)]
    pub duplicates: DuplicatePolicy,

    /// Sort siblings by composite key after building.
    #[serde(default)]
    pub sort_children: bool,
}

/// What a failed record does to the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    #[default]
    Abort,
    Skip,
}

impl OnError {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "fail" => Some(Self::Abort),
            "skip" | "continue" => Some(Self::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    #[serde(default)]
    pub on_error: OnError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_prefix_len() -> usize {
    DEFAULT_PREFIX_LEN
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
