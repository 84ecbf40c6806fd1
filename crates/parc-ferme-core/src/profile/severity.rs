//! Severity taxonomy: typed levels and the permissive raw-entry parser.

use std::sync::LazyLock;

use serde_yaml::{Mapping, Value};

/// One tier of a severity taxonomy, e.g. `🔴 CRITICAL - Must fix before merge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityLevel {
    pub emoji: String,
    pub label: String,
    pub description: String,
}

impl SeverityLevel {
    pub fn new(
        emoji: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            emoji: emoji.into(),
            label: label.into(),
            description: description.into(),
        }
    }
}

/// A severity entry as written in a config file. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSeverityEntry {
    pub emoji: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
}

impl RawSeverityEntry {
    /// Read the three known keys from a YAML mapping.
    ///
    /// Scalars are stringified (`label: 1` reads as `"1"`); nested values
    /// and unknown keys are ignored.
    pub fn from_yaml(entry: &Mapping) -> Self {
        Self {
            emoji: scalar_field(entry, "emoji"),
            label: scalar_field(entry, "label"),
            description: scalar_field(entry, "description"),
        }
    }
}

fn scalar_field(entry: &Mapping, key: &str) -> Option<String> {
    match entry.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Convert raw entries into typed levels, defaulting missing fields to `""`.
///
/// Order is preserved and duplicate labels are allowed.
pub fn parse_severity_levels(entries: &[RawSeverityEntry]) -> Vec<SeverityLevel> {
    entries
        .iter()
        .map(|entry| SeverityLevel {
            emoji: entry.emoji.clone().unwrap_or_default(),
            label: entry.label.clone().unwrap_or_default(),
            description: entry.description.clone().unwrap_or_default(),
        })
        .collect()
}

/// The CRITICAL / WARNING / INFO taxonomy shared by every built-in profile.
pub static DEFAULT_SEVERITY_LEVELS: LazyLock<Vec<SeverityLevel>> = LazyLock::new(|| {
    vec![
        SeverityLevel::new("\u{1F534}", "CRITICAL", "Must fix before merge"),
        SeverityLevel::new("\u{1F7E1}", "WARNING", "Should fix, potential issue"),
        SeverityLevel::new("\u{1F535}", "INFO", "Nice to fix, minor improvement"),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let entries = vec![RawSeverityEntry {
            label: Some("BLOCKER".to_string()),
            ..Default::default()
        }];
        let levels = parse_severity_levels(&entries);
        assert_eq!(levels, vec![SeverityLevel::new("", "BLOCKER", "")]);
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let raw = |label: &str| RawSeverityEntry {
            label: Some(label.to_string()),
            ..Default::default()
        };
        let levels = parse_severity_levels(&[raw("LOW"), raw("HIGH"), raw("LOW")]);
        let labels: Vec<_> = levels.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["LOW", "HIGH", "LOW"]);
    }

    #[test]
    fn test_from_yaml_stringifies_scalars() {
        let entry: Mapping =
            serde_yaml::from_str("emoji: x\nlabel: 1\ndescription: [nested]").unwrap();
        let raw = RawSeverityEntry::from_yaml(&entry);
        assert_eq!(raw.emoji.as_deref(), Some("x"));
        assert_eq!(raw.label.as_deref(), Some("1"));
        assert_eq!(raw.description, None);
    }

    #[test]
    fn test_default_taxonomy_labels() {
        let labels: Vec<_> = DEFAULT_SEVERITY_LEVELS
            .iter()
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(labels, ["CRITICAL", "WARNING", "INFO"]);
    }
}
