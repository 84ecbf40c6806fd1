//! Parc Fermé - automated PR code review
//!
//! Drives the GitHub CLI and the Claude CLI to review a pull request under a
//! named review profile:
//! - `profile`: built-in profiles, the merge engine and lookup
//! - `config`: layered `.reviewrc.yml` loading and custom profile resolution
//! - `github` / `reviewer`: the `gh` and `claude` collaborators
//! - `format`: terminal and PR-comment rendering

pub mod config;
pub mod error;
pub mod format;
pub mod git;
pub mod github;
pub mod process;
pub mod profile;
pub mod reviewer;
pub mod telemetry;

pub use config::{
    load_config, load_config_with, CommentMode, CommentSettings, ConfigDiscovery, MergedConfig,
};
pub use error::{
    ConfigError, GitHubError, ParcFermeError, ProfileLookupError, Result, ReviewError, ToolError,
};
pub use github::{check_gh_available, GitHubClient, PrInfo};
pub use profile::{
    get_profile, list_profiles, merge_profile, parse_severity_levels, Profile, ProfileOverrides,
    ResolvedProfileSet, SeverityInput, SeverityLevel,
};
pub use reviewer::{
    build_prompt, check_claude_available, has_critical_issues, Reviewer, MAX_DIFF_CHARS,
};
pub use telemetry::init_tracing;

/// parc-ferme version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
