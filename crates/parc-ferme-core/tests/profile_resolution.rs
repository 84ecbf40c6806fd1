//! Integration tests for profile lookup, merging and `extends` resolution.

use std::collections::BTreeMap;

use parc_ferme_core::config::resolve_custom_profiles;
use parc_ferme_core::profile::{builtin_profiles, DEFAULT_SEVERITY_LEVELS};
use parc_ferme_core::{
    get_profile, list_profiles, merge_profile, ConfigError, ProfileOverrides, SeverityInput,
    SeverityLevel,
};
use serde_yaml::Value;

fn raw(src: &str) -> BTreeMap<String, Value> {
    serde_yaml::from_str(src).expect("valid test yaml")
}

// ── Registry ──────────────────────────────────────────────────────────────

#[test]
fn every_builtin_resolves_to_its_own_name() {
    for name in ["default", "security", "performance", "angular"] {
        assert_eq!(get_profile(name, None).unwrap().name, name);
    }
}

#[test]
fn unknown_builtin_lookup_lists_sorted_names() {
    let msg = get_profile("typo", None).unwrap_err().to_string();
    let mut names: Vec<_> = builtin_profiles().keys().cloned().collect();
    names.sort();
    assert!(msg.contains(&names.join(", ")), "{msg}");
}

#[test]
fn list_profiles_without_custom_is_builtins() {
    assert_eq!(&list_profiles(None), builtin_profiles());
}

// ── Merge engine ──────────────────────────────────────────────────────────

#[test]
fn merge_with_empty_overrides_is_structurally_equal() {
    for base in builtin_profiles().values() {
        let merged = merge_profile(base, &ProfileOverrides::default());
        assert_eq!(&merged, base);
    }
}

#[test]
fn merge_never_mutates_base() {
    let base = builtin_profiles()["default"].clone();
    let snapshot = base.clone();
    let overrides = ProfileOverrides {
        name: Some("x".to_string()),
        rules: Some(vec![]),
        severity_levels: Some(SeverityInput::Typed(vec![SeverityLevel::new("a", "b", "c")])),
        extra_instructions: Some("more".to_string()),
        ..Default::default()
    };
    let merged = merge_profile(&base, &overrides);
    assert_eq!(base, snapshot);
    assert_eq!(merged.name, "x");
    assert!(merged.rules.is_empty());
    assert_eq!(merged.extra_instructions, "more");
}

// ── Extension resolution ──────────────────────────────────────────────────

#[test]
fn mutual_extends_fails_naming_both() {
    let err = resolve_custom_profiles(raw("A: {extends: B}\nB: {extends: A}\n")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("A, B"), "{msg}");
}

#[test]
fn three_way_cycle_reports_all_members_only() {
    let err = resolve_custom_profiles(raw(
        "x: {extends: y}\ny: {extends: z}\nz: {extends: x}\nok: {extends: default}\n",
    ))
    .unwrap_err();
    match err {
        ConfigError::Unresolved(names) => assert_eq!(names, ["x", "y", "z"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn chain_resolves_regardless_of_declaration_order() {
    // `level2` is declared (and sorts) before `level1`.
    let yaml = "level2:\n  extends: level1\n  extra_instructions: L2\n\
                level1:\n  extends: default\n  extra_instructions: L1\n";
    let profiles = resolve_custom_profiles(raw(yaml)).unwrap();

    let level2 = &profiles["level2"];
    assert_eq!(level2.name, "level2");
    assert_eq!(level2.extra_instructions, "L1\nL2");
    assert_eq!(level2.rules, builtin_profiles()["default"].rules);
}

#[test]
fn long_chain_converges_within_budget() {
    // p0 <- p1 <- ... <- p9, named so that each child sorts before its parent.
    let mut yaml = String::from("p9: {extends: default, extra_instructions: '9'}\n");
    for i in (0..9).rev() {
        yaml.push_str(&format!(
            "p{i}: {{extends: p{}, extra_instructions: '{i}'}}\n",
            i + 1
        ));
    }
    let profiles = resolve_custom_profiles(raw(&yaml)).unwrap();
    assert_eq!(profiles.len(), 10);
    assert_eq!(profiles["p0"].extra_instructions, "9\n8\n7\n6\n5\n4\n3\n2\n1\n0");
}

#[test]
fn extended_profile_replaces_lists_wholesale() {
    let profiles = resolve_custom_profiles(raw(
        "lean:\n  extends: performance\n  checks: [Only N+1 queries]\n",
    ))
    .unwrap();
    assert_eq!(profiles["lean"].checks, ["Only N+1 queries"]);
    assert_eq!(profiles["lean"].rules, builtin_profiles()["performance"].rules);
}

#[test]
fn extended_profile_custom_severity_levels() {
    let profiles = resolve_custom_profiles(raw(
        "graded:\n  extends: default\n  severity_levels:\n    - {emoji: A, label: MUST}\n    \
         - {label: SHOULD, description: soon}\n",
    ))
    .unwrap();
    assert_eq!(
        profiles["graded"].severity_levels,
        vec![
            SeverityLevel::new("A", "MUST", ""),
            SeverityLevel::new("", "SHOULD", "soon"),
        ]
    );
}

#[test]
fn extended_profile_empty_severity_keeps_base() {
    let profiles =
        resolve_custom_profiles(raw("same:\n  extends: default\n  severity_levels: []\n")).unwrap();
    assert_eq!(profiles["same"].severity_levels, *DEFAULT_SEVERITY_LEVELS);
}

#[test]
fn custom_profiles_visible_through_lookup() {
    let custom = resolve_custom_profiles(raw(
        "security: {description: Our own}\nteam: {extends: security}\n",
    ))
    .unwrap();

    // The shadowing custom `security` wins lookups...
    assert_eq!(get_profile("security", Some(&custom)).unwrap().description, "Our own");
    // ...but `team` extended the built-in.
    let team = get_profile("team", Some(&custom)).unwrap();
    assert_eq!(team.description, "Security-focused review");

    let err = get_profile("nope", Some(&custom)).unwrap_err().to_string();
    assert!(err.contains("angular, default, performance, security, team"), "{err}");
}
