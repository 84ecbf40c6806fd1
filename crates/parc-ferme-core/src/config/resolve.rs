//! Custom profile resolution.
//!
//! Definitions may `extends` a built-in or another custom profile and may
//! appear in any order, so resolution iterates to a fixpoint: each pass
//! resolves every definition whose base is already known, and the loop is
//! bounded by `n + 1` passes for `n` definitions.

use std::collections::BTreeMap;

use serde_yaml::Value;
use tracing::debug;

use super::source::describe;
use crate::error::ConfigError;
use crate::profile::{
    builtin_profiles, merge_profile, Profile, ProfileOverrides, ResolvedProfileSet,
};

enum Attempt {
    Resolved(Profile),
    /// The `extends` target is not known yet.
    Pending(Value),
    /// Not a mapping; dropped without error.
    Skipped,
}

/// Resolve raw profile definitions into concrete profiles.
///
/// `extends` targets are looked up in the built-in table first, then among
/// custom profiles resolved so far. A custom profile that shadows a built-in
/// name never becomes the base for another profile extending that name.
///
/// Fails with [`ConfigError::Unresolved`] (names sorted) when definitions
/// remain after the pass budget, which is how cycles and missing bases surface.
pub fn resolve_custom_profiles(
    raw: BTreeMap<String, Value>,
) -> Result<ResolvedProfileSet, ConfigError> {
    let mut resolved = ResolvedProfileSet::new();
    let mut unresolved = raw;
    let max_passes = unresolved.len() + 1;

    for pass in 1..=max_passes {
        if unresolved.is_empty() {
            break;
        }
        let before = unresolved.len();
        let mut pending = BTreeMap::new();

        for (name, definition) in std::mem::take(&mut unresolved) {
            match attempt(&name, definition, &resolved)? {
                Attempt::Resolved(profile) => {
                    resolved.insert(name, profile);
                }
                Attempt::Pending(definition) => {
                    pending.insert(name, definition);
                }
                Attempt::Skipped => {
                    debug!(profile = %name, "skipping profile definition that is not a mapping");
                }
            }
        }

        unresolved = pending;
        debug!(
            pass,
            resolved = resolved.len(),
            remaining = unresolved.len(),
            "profile resolution pass"
        );
        // Nothing changed, so later passes cannot make progress either.
        if unresolved.len() == before {
            break;
        }
    }

    if !unresolved.is_empty() {
        return Err(ConfigError::Unresolved(unresolved.into_keys().collect()));
    }
    Ok(resolved)
}

fn attempt(
    name: &str,
    definition: Value,
    resolved: &ResolvedProfileSet,
) -> Result<Attempt, ConfigError> {
    let Value::Mapping(map) = &definition else {
        return Ok(Attempt::Skipped);
    };

    let extends = match map.get("extends") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(other) => {
            return Err(ConfigError::InvalidProfile {
                name: name.to_string(),
                reason: format!("'extends' must be a profile name, got '{}'", describe(other)),
            })
        }
    };

    let overrides = ProfileOverrides::from_yaml(name, map)?.with_name(name);

    let profile = match extends {
        Some(base_name) => {
            let base = builtin_profiles()
                .get(base_name)
                .or_else(|| resolved.get(base_name));
            match base {
                Some(base) => merge_profile(base, &overrides),
                None => return Ok(Attempt::Pending(definition)),
            }
        }
        None => merge_profile(&Profile::skeleton(name), &overrides),
    };
    Ok(Attempt::Resolved(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{DEFAULT_OUTPUT_FORMAT, DEFAULT_SEVERITY_LEVELS};

    fn raw(src: &str) -> BTreeMap<String, Value> {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_custom_profiles(BTreeMap::new()).unwrap().is_empty());
    }

    #[test]
    fn test_standalone_defaults() {
        let profiles = resolve_custom_profiles(raw("mine: {}")).unwrap();
        let mine = &profiles["mine"];
        assert_eq!(mine.name, "mine");
        assert_eq!(mine.description, "mine");
        assert_eq!(mine.system_role, "code reviewer");
        assert!(mine.rules.is_empty());
        assert_eq!(mine.severity_levels, *DEFAULT_SEVERITY_LEVELS);
        assert_eq!(mine.output_format, DEFAULT_OUTPUT_FORMAT);
        assert_eq!(mine.extra_instructions, "");
    }

    #[test]
    fn test_extends_builtin_forces_name() {
        let profiles =
            resolve_custom_profiles(raw("strict: {extends: security, name: other}")).unwrap();
        let strict = &profiles["strict"];
        assert_eq!(strict.name, "strict");
        assert_eq!(strict.checks, builtin_profiles()["security"].checks);
    }

    #[test]
    fn test_reverse_order_chain() {
        // BTreeMap order puts "a_child" before "b_parent".
        let profiles = resolve_custom_profiles(raw(
            "a_child: {extends: b_parent, extra_instructions: two}\n\
             b_parent: {extends: default, extra_instructions: one}\n",
        ))
        .unwrap();
        assert_eq!(profiles["a_child"].extra_instructions, "one\ntwo");
    }

    #[test]
    fn test_cycle_names_both() {
        let err = resolve_custom_profiles(raw("a: {extends: b}\nb: {extends: a}\n")).unwrap_err();
        match err {
            ConfigError::Unresolved(names) => assert_eq!(names, ["a", "b"]),
            other => panic!("expected Unresolved, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_base() {
        let err = resolve_custom_profiles(raw("x: {extends: ghost}")).unwrap_err();
        assert!(err.to_string().ends_with(": x"));
    }

    #[test]
    fn test_non_mapping_skipped() {
        let profiles = resolve_custom_profiles(raw("bad: just a string\ngood: {}\n")).unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles.contains_key("good"));
    }

    #[test]
    fn test_extends_uses_original_builtin_not_shadow() {
        let profiles = resolve_custom_profiles(raw(
            "default: {description: shadowed, rules: [custom]}\n\
             child: {extends: default}\n",
        ))
        .unwrap();
        assert_eq!(profiles["default"].description, "shadowed");
        assert_eq!(profiles["child"].rules, builtin_profiles()["default"].rules);
        assert_eq!(profiles["child"].description, "General code review");
    }

    #[test]
    fn test_bad_field_type_names_profile() {
        let err = resolve_custom_profiles(raw("broken: {rules: 5}")).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidProfile { ref name, .. } if name == "broken"),
            "{err:?}"
        );
    }

    #[test]
    fn test_non_string_extends_rejected() {
        let err = resolve_custom_profiles(raw("odd: {extends: [default]}")).unwrap_err();
        assert!(err.to_string().contains("invalid profile 'odd'"));
    }

    #[test]
    fn test_empty_extends_is_standalone() {
        let profiles = resolve_custom_profiles(raw("solo: {extends: ''}")).unwrap();
        assert_eq!(profiles["solo"].system_role, "code reviewer");
    }

    #[test]
    fn test_standalone_custom_severity() {
        let profiles = resolve_custom_profiles(raw(
            "solo:\n  severity_levels:\n    - {emoji: x, label: HIGH, description: bad}\n",
        ))
        .unwrap();
        let labels: Vec<_> = profiles["solo"]
            .severity_levels
            .iter()
            .map(|l| l.label.as_str())
            .collect();
        assert_eq!(labels, ["HIGH"]);
    }
}
