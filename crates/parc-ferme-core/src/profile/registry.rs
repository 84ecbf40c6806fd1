//! Built-in profiles and name lookup.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::severity::DEFAULT_SEVERITY_LEVELS;
use super::{Profile, ResolvedProfileSet, DEFAULT_OUTPUT_FORMAT};
use crate::error::ProfileLookupError;

static BUILTIN_PROFILES: LazyLock<BTreeMap<String, Profile>> = LazyLock::new(|| {
    [
        builtin(
            "default",
            "General code review",
            "senior code reviewer",
            &[
                "Only flag REAL issues, not style preferences",
                "Be concise, no filler, no praise",
                "If no issues found, just say: ✅ LGTM",
            ],
            &[
                "Bugs: Logic errors, null/undefined issues, incorrect types",
                "Security: XSS, injection, exposed secrets",
                "Breaking changes: Public API changes, backward compatibility",
                "Code smells: Dead code, duplicated logic, overly complex conditions",
                "Typos: In code identifiers and user-facing strings",
            ],
        ),
        builtin(
            "security",
            "Security-focused review",
            "application security specialist",
            &[
                "Focus ONLY on security issues, ignore style and conventions",
                "Be concise, no filler, no praise",
                "If no issues found, just say: ✅ LGTM - No security issues found",
            ],
            &[
                "XSS: unsafe innerHTML, bypassSecurityTrust*, template injection",
                "Injection: SQL/NoSQL injection, command injection, LDAP injection",
                "Secrets: Hardcoded credentials, API keys, tokens in source code",
                "CSRF: Missing CSRF protection on state-changing endpoints",
                "Auth bypass: Broken authentication, improper authorization checks",
                "Path traversal: Unsanitized file paths, directory traversal",
                "SSRF: Server-side request forgery via user-controlled URLs",
                "Insecure deserialization: Unsafe JSON.parse on untrusted data",
                "Prototype pollution: Unsafe object merging or property assignment",
                "eval/Function: Dynamic code execution with user input",
            ],
        ),
        builtin(
            "performance",
            "Performance-focused review",
            "performance engineer",
            &[
                "Focus ONLY on performance issues, ignore style and conventions",
                "Be concise, no filler, no praise",
                "If no issues found, just say: ✅ LGTM - No performance issues found",
            ],
            &[
                "Memory leaks: Unsubscribed observables, detached DOM references, unclosed resources",
                "N+1 queries: Database calls in loops, repeated API calls",
                "Bundle size: Large imports that could be tree-shaken or lazy loaded",
                "Unnecessary re-renders: Missing trackBy, excessive change detection",
                "Algorithm complexity: O(n²) or worse when O(n) is possible",
                "Missing caching: Repeated expensive computations without memoization",
                "Large payloads: Fetching unnecessary data, missing pagination",
                "Blocking operations: Synchronous I/O, long-running main thread tasks",
            ],
        ),
        builtin(
            "angular",
            "Angular/TypeScript specific review",
            "senior Angular/TypeScript code reviewer",
            &[
                "Only flag REAL issues, not style preferences",
                "Be concise, no filler, no praise",
                "If no issues found, just say: ✅ LGTM",
            ],
            &[
                "Bugs: Logic errors, null/undefined issues, incorrect types",
                "Security: XSS, injection, exposed secrets, unsafe innerHTML",
                "Breaking changes: Public API changes, module federation exports",
                "Performance: Memory leaks (unsubscribed observables), unnecessary re-renders",
                "Angular anti-patterns: Missing OnDestroy cleanup, improper change detection",
                "RxJS issues: Missing unsubscribe, improper operators, nested subscribes",
                "TypeScript: 'any' type abuse, missing null checks",
                "Typos: In code identifiers and user-facing strings",
            ],
        ),
    ]
    .into_iter()
    .map(|p| (p.name.clone(), p))
    .collect()
});

fn builtin(
    name: &str,
    description: &str,
    system_role: &str,
    rules: &[&str],
    checks: &[&str],
) -> Profile {
    Profile {
        name: name.to_string(),
        description: description.to_string(),
        system_role: system_role.to_string(),
        rules: rules.iter().map(|s| s.to_string()).collect(),
        checks: checks.iter().map(|s| s.to_string()).collect(),
        severity_levels: DEFAULT_SEVERITY_LEVELS.clone(),
        output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
        extra_instructions: String::new(),
    }
}

/// The built-in profile table. Built once, never mutated.
pub fn builtin_profiles() -> &'static BTreeMap<String, Profile> {
    &BUILTIN_PROFILES
}

/// All profiles visible to the user: built-ins, with custom profiles
/// replacing any built-in of the same name.
pub fn list_profiles(custom: Option<&ResolvedProfileSet>) -> BTreeMap<String, Profile> {
    let mut all = builtin_profiles().clone();
    if let Some(custom) = custom {
        all.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    all
}

/// Look up a profile by name across built-ins and custom profiles.
pub fn get_profile(
    name: &str,
    custom: Option<&ResolvedProfileSet>,
) -> Result<Profile, ProfileLookupError> {
    let mut all = list_profiles(custom);
    all.remove(name).ok_or_else(|| ProfileLookupError::Unknown {
        name: name.to_string(),
        available: all.into_keys().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names() {
        let names: Vec<_> = builtin_profiles().keys().map(String::as_str).collect();
        assert_eq!(names, ["angular", "default", "performance", "security"]);
    }

    #[test]
    fn test_get_profile_returns_requested_name() {
        for name in builtin_profiles().keys() {
            let profile = get_profile(name, None).unwrap();
            assert_eq!(&profile.name, name);
        }
    }

    #[test]
    fn test_unknown_profile_lists_sorted_builtins() {
        let err = get_profile("nonexistent", None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nonexistent"));
        assert!(msg.contains("angular, default, performance, security"));
    }

    #[test]
    fn test_custom_overrides_builtin_on_collision() {
        let mut custom = ResolvedProfileSet::new();
        let mut mine = Profile::skeleton("security");
        mine.description = "Our security rules".to_string();
        custom.insert("security".to_string(), mine);
        custom.insert("team".to_string(), Profile::skeleton("team"));

        let all = list_profiles(Some(&custom));
        assert_eq!(all.len(), 5);
        assert_eq!(all["security"].description, "Our security rules");

        let team = get_profile("team", Some(&custom)).unwrap();
        assert_eq!(team.name, "team");
    }

    #[test]
    fn test_unknown_profile_lists_custom_names_too() {
        let mut custom = ResolvedProfileSet::new();
        custom.insert("zeta".to_string(), Profile::skeleton("zeta"));
        let err = get_profile("nope", Some(&custom)).unwrap_err();
        assert!(err
            .to_string()
            .ends_with("angular, default, performance, security, zeta"));
    }

    #[test]
    fn test_builtins_use_default_taxonomy() {
        for profile in builtin_profiles().values() {
            assert_eq!(profile.severity_levels, *DEFAULT_SEVERITY_LEVELS);
            assert!(profile.extra_instructions.is_empty());
        }
    }
}
