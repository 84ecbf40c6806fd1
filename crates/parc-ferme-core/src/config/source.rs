//! Reading a single config source and folding it into the running config.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::warn;

use super::{CommentMode, MergedConfig};
use crate::error::ConfigError;

/// Read `path` and return its top-level mapping. An empty file is an empty mapping.
///
/// `<<` merge keys are expanded, so anchors can share profile fields.
pub fn read_source(path: &Path) -> Result<Mapping, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let invalid = |source| ConfigError::InvalidYaml {
        path: path.to_path_buf(),
        source,
    };
    let mut value: Value = serde_yaml::from_str(&content).map_err(invalid)?;
    value.apply_merge().map_err(invalid)?;

    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

/// Apply one source's scalar settings to `config` and collect its raw
/// profile definitions into `raw_profiles` (same name: later source wins).
pub fn apply_source(
    config: &mut MergedConfig,
    raw_profiles: &mut BTreeMap<String, Value>,
    data: &Mapping,
) -> Result<(), ConfigError> {
    if let Some(value) = data.get("default_profile") {
        config.default_profile = match value {
            Value::String(s) => s.clone(),
            other => return Err(invalid_value("default_profile", "must be a string", other)),
        };
    }

    if let Some(value) = data.get("claude_model") {
        config.claude_model = match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => return Err(invalid_value("claude_model", "must be a string", other)),
        };
    }

    if let Some(value) = data.get("review_timeout") {
        config.review_timeout = parse_timeout(value)?;
    }

    // A non-mapping `comment` is ignored; sub-keys merge into the running value.
    if let Some(Value::Mapping(comment)) = data.get("comment") {
        if let Some(value) = comment.get("enabled") {
            config.comment.enabled = match value {
                Value::Bool(b) => *b,
                other => return Err(invalid_value("comment.enabled", "must be true or false", other)),
            };
        }
        if let Some(value) = comment.get("mode") {
            config.comment.mode = match value {
                Value::String(s) => s.parse::<CommentMode>()?,
                other => {
                    return Err(invalid_value("comment.mode", "must be 'create' or 'update'", other))
                }
            };
        }
    }

    if let Some(Value::Mapping(profiles)) = data.get("profiles") {
        for (key, definition) in profiles {
            match key {
                Value::String(name) => {
                    raw_profiles.insert(name.clone(), definition.clone());
                }
                other => warn!(key = %describe(other), "skipping profile with non-string name"),
            }
        }
    }

    Ok(())
}

/// Parse `review_timeout`: a positive integer, given as a number or a string.
/// A float with no fractional part (`600.0`) counts as an integer.
pub fn parse_timeout(value: &Value) -> Result<u64, ConfigError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| (0.0..=u64::MAX as f64).contains(f))
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed {
        Some(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidTimeout {
            value: describe(value),
        }),
    }
}

fn invalid_value(key: &str, reason: &str, value: &Value) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: format!("{reason}, got '{}'", describe(value)),
    }
}

/// Render a YAML value for an error message.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().replace('\n', " "))
            .unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}
