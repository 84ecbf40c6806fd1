//! Review profiles.
//!
//! A profile bundles everything that shapes a review prompt:
//! - the reviewer's role and the rules it must follow
//! - the list of things to check for
//! - the severity taxonomy and output format for each finding
//!
//! Built-in profiles live in [`registry`]; custom ones are resolved from
//! config and may extend built-ins through [`merge`].

pub mod merge;
pub mod registry;
pub mod severity;

use std::collections::BTreeMap;

pub use merge::{merge_profile, ProfileOverrides, SeverityInput};
pub use registry::{builtin_profiles, get_profile, list_profiles};
pub use severity::{
    parse_severity_levels, RawSeverityEntry, SeverityLevel, DEFAULT_SEVERITY_LEVELS,
};

/// Finding template used when a profile does not supply its own.
pub const DEFAULT_OUTPUT_FORMAT: &str = "[SEVERITY] file:line — description";

/// Reviewer role for standalone custom profiles that omit `system_role`.
pub const DEFAULT_SYSTEM_ROLE: &str = "code reviewer";

/// Custom profiles keyed by name, as produced by config resolution.
pub type ResolvedProfileSet = BTreeMap<String, Profile>;

/// A named bundle of review rules, checks, severity taxonomy and template.
///
/// Profiles are never mutated once built; [`merge_profile`] returns a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub description: String,
    pub system_role: String,
    pub rules: Vec<String>,
    pub checks: Vec<String>,
    pub severity_levels: Vec<SeverityLevel>,
    pub output_format: String,
    pub extra_instructions: String,
}

impl Profile {
    /// The base a standalone custom profile is merged onto: described by its
    /// own name, generic reviewer role, no rules or checks, default taxonomy.
    pub fn skeleton(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: name.to_string(),
            system_role: DEFAULT_SYSTEM_ROLE.to_string(),
            rules: Vec::new(),
            checks: Vec::new(),
            severity_levels: DEFAULT_SEVERITY_LEVELS.clone(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            extra_instructions: String::new(),
        }
    }
}
