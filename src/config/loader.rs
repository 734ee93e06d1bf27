//! Config discovery and loading.
//!
//! Priority, lowest first: built-in defaults, the first config file found,
//! environment overrides.
//!
//! File search order: explicit path, `./tracegraph.yaml`, then
//! `<platform config dir>/tracegraph/config.yaml`.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::config::schema::{OnError, TraceGraphConfig};
use crate::error::{Result, TraceGraphError};
use crate::hierarchy::DuplicatePolicy;

pub const LOCAL_CONFIG_FILE: &str = "tracegraph.yaml";

pub const ENV_PREFIX_LEN: &str = "TRACEGRAPH_PREFIX_LEN";
pub const ENV_DUPLICATES: &str = "TRACEGRAPH_DUPLICATES";
pub const ENV_ON_ERROR: &str = "TRACEGRAPH_ON_ERROR";

/// Load the effective configuration.
///
/// An explicit `path` must exist; discovered files are optional.
pub fn load_config(path: Option<&Path>) -> Result<TraceGraphConfig> {
    let file = match path {
        Some(p) => Some(p.to_path_buf()),
        None => discover_config_file(),
    };

    let mut config = match file {
        Some(p) => {
            tracing::debug!(path = %p.display(), "loading config");
            load_file(&p)?
        }
        None => TraceGraphConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse one YAML config file.
pub fn load_file(path: &Path) -> Result<TraceGraphConfig> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(TraceGraphConfig::default());
    }
    Ok(serde_yaml::from_str(&text)?)
}

fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    let global = ProjectDirs::from("", "", "tracegraph")?
        .config_dir()
        .join("config.yaml");
    global.is_file().then_some(global)
}

/// Apply `TRACEGRAPH_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut TraceGraphConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_PREFIX_LEN) {
        config.keys.prefix_len = raw.trim().parse().map_err(|_| {
            TraceGraphError::Config(format!("{ENV_PREFIX_LEN}: not a number: {raw}"))
        })?;
    }
    if let Some(raw) = lookup(ENV_DUPLICATES) {
        config.hierarchy.duplicates = DuplicatePolicy::from_str_loose(&raw).ok_or_else(|| {
            TraceGraphError::Config(format!("{ENV_DUPLICATES}: unknown policy: {raw}"))
        })?;
    }
    if let Some(raw) = lookup(ENV_ON_ERROR) {
        config.normalize.on_error = OnError::from_str_loose(&raw).ok_or_else(|| {
            TraceGraphError::Config(format!("{ENV_ON_ERROR}: unknown value: {raw}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_file_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.yaml");
        std::fs::write(&path, "keys:\n  prefix_len: 4\n").unwrap();
        let config = load_file(&path).unwrap();
        assert_eq!(config.keys.prefix_len, 4);
    }

    #[test]
    fn empty_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cfg.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(load_file(&path).unwrap(), TraceGraphConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.yaml")));
        assert!(matches!(result, Err(TraceGraphError::Io(_))));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = TraceGraphConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_PREFIX_LEN, "10"),
                (ENV_DUPLICATES, "reject"),
                (ENV_ON_ERROR, "skip"),
            ]),
        )
        .unwrap();
        assert_eq!(config.keys.prefix_len, 10);
        assert_eq!(config.hierarchy.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.normalize.on_error, OnError::Skip);
    }

    #[test]
    fn bad_env_override_is_a_config_error() {
        let mut config = TraceGraphConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_PREFIX_LEN, "eight")])).unwrap_err();
        assert!(matches!(err, TraceGraphError::Config(msg) if msg.contains(ENV_PREFIX_LEN)));
    }

    #[test]
    fn no_env_leaves_config_untouched() {
        let mut config = TraceGraphConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config, TraceGraphConfig::default());
    }
}
