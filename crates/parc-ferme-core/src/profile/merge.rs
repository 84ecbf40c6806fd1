//! Profile merge engine.
//!
//! Merge semantics:
//! - Scalars and lists: override replaces, otherwise inherited (lists are
//!   replaced wholesale, never appended)
//! - Severity levels: a non-empty override replaces, empty keeps the base
//! - Extra instructions: accumulate, base first, joined by a newline

use serde_yaml::{Mapping, Value};

use super::severity::{parse_severity_levels, RawSeverityEntry, SeverityLevel};
use super::Profile;
use crate::error::ConfigError;

/// Severity levels supplied to a merge, either straight from config or
/// already typed by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeverityInput {
    Raw(Vec<RawSeverityEntry>),
    Typed(Vec<SeverityLevel>),
}

impl SeverityInput {
    pub fn is_empty(&self) -> bool {
        match self {
            SeverityInput::Raw(entries) => entries.is_empty(),
            SeverityInput::Typed(levels) => levels.is_empty(),
        }
    }

    pub fn to_levels(&self) -> Vec<SeverityLevel> {
        match self {
            SeverityInput::Raw(entries) => parse_severity_levels(entries),
            SeverityInput::Typed(levels) => levels.clone(),
        }
    }
}

/// The fields a profile definition may override. `None` means inherit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_role: Option<String>,
    pub rules: Option<Vec<String>>,
    pub checks: Option<Vec<String>>,
    pub severity_levels: Option<SeverityInput>,
    pub output_format: Option<String>,
    pub extra_instructions: Option<String>,
}

impl ProfileOverrides {
    /// Read overrides from a raw profile definition.
    ///
    /// `name` and `extends` are not read here: the name always comes from the
    /// definition's key, and `extends` is handled by the resolver. A field of
    /// the wrong type fails with [`ConfigError::InvalidProfile`]. Explicit
    /// `null` counts as absent.
    pub fn from_yaml(profile: &str, definition: &Mapping) -> Result<Self, ConfigError> {
        Ok(Self {
            name: None,
            description: string_field(profile, definition, "description")?,
            system_role: string_field(profile, definition, "system_role")?,
            rules: list_field(profile, definition, "rules")?,
            checks: list_field(profile, definition, "checks")?,
            severity_levels: severity_field(profile, definition)?,
            output_format: string_field(profile, definition, "output_format")?,
            extra_instructions: string_field(profile, definition, "extra_instructions")?,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Build a new profile from `base` with `overrides` applied. `base` is untouched.
pub fn merge_profile(base: &Profile, overrides: &ProfileOverrides) -> Profile {
    let severity_levels = match &overrides.severity_levels {
        Some(input) if !input.is_empty() => input.to_levels(),
        _ => base.severity_levels.clone(),
    };

    Profile {
        name: pick(&overrides.name, &base.name),
        description: pick(&overrides.description, &base.description),
        system_role: pick(&overrides.system_role, &base.system_role),
        rules: pick(&overrides.rules, &base.rules),
        checks: pick(&overrides.checks, &base.checks),
        severity_levels,
        output_format: pick(&overrides.output_format, &base.output_format),
        extra_instructions: join_instructions(
            &base.extra_instructions,
            overrides.extra_instructions.as_deref().unwrap_or_default(),
        ),
    }
}

fn pick<T: Clone>(over: &Option<T>, base: &T) -> T {
    over.as_ref().unwrap_or(base).clone()
}

fn join_instructions(base: &str, extra: &str) -> String {
    [base, extra]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn invalid(profile: &str, reason: String) -> ConfigError {
    ConfigError::InvalidProfile {
        name: profile.to_string(),
        reason,
    }
}

fn string_field(profile: &str, def: &Mapping, key: &str) -> Result<Option<String>, ConfigError> {
    match def.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(profile, format!("'{key}' must be a string"))),
    }
}

fn list_field(
    profile: &str,
    def: &Mapping,
    key: &str,
) -> Result<Option<Vec<String>>, ConfigError> {
    let items = match def.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items,
        Some(_) => return Err(invalid(profile, format!("'{key}' must be a list of strings"))),
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(invalid(profile, format!("'{key}' must be a list of strings"))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn severity_field(profile: &str, def: &Mapping) -> Result<Option<SeverityInput>, ConfigError> {
    let items = match def.get("severity_levels") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            return Err(invalid(
                profile,
                "'severity_levels' must be a list of mappings".to_string(),
            ))
        }
    };
    let entries = items
        .iter()
        .map(|item| match item {
            Value::Mapping(entry) => Ok(RawSeverityEntry::from_yaml(entry)),
            _ => Err(invalid(
                profile,
                "each severity level must be a mapping with emoji/label/description".to_string(),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(SeverityInput::Raw(entries)))
}
