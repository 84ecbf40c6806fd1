//! Layered configuration.
//!
//! Sources are folded lowest precedence first:
//! 1. Built-in defaults
//! 2. User config (`~/.config/parc-ferme/.reviewrc.yml`)
//! 3. Project config (`.reviewrc.yml` at the git root or cwd)
//!
//! An explicit `--config` path replaces discovery and is the only source.
//! Scalars: later source wins. `comment`: merged by sub-key. `profiles`:
//! merged by name, then resolved once all sources are read.

mod discovery;
mod resolve;
mod source;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

pub use discovery::{user_config_dir, ConfigDiscovery, CONFIG_FILENAME};
pub use resolve::resolve_custom_profiles;
pub use source::{apply_source, parse_timeout, read_source};

use crate::error::ConfigError;
use crate::profile::ResolvedProfileSet;

pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_REVIEW_TIMEOUT_SECS: u64 = 300;

/// How a review is posted back to the PR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentMode {
    /// Always add a new comment.
    #[default]
    Create,
    /// Edit the last comment left by the current user.
    Update,
}

impl CommentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentMode::Create => "create",
            CommentMode::Update => "update",
        }
    }
}

impl fmt::Display for CommentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(CommentMode::Create),
            "update" => Ok(CommentMode::Update),
            other => Err(ConfigError::InvalidValue {
                key: "comment.mode".to_string(),
                reason: format!("must be 'create' or 'update', got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentSettings {
    pub enabled: bool,
    pub mode: CommentMode,
}

/// The effective configuration for one review run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub default_profile: String,
    pub claude_model: Option<String>,
    /// Seconds allowed for the Claude review call.
    pub review_timeout: u64,
    pub comment: CommentSettings,
    /// `None` when no source defines any profile.
    pub custom_profiles: Option<ResolvedProfileSet>,
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self {
            default_profile: DEFAULT_PROFILE.to_string(),
            claude_model: None,
            review_timeout: DEFAULT_REVIEW_TIMEOUT_SECS,
            comment: CommentSettings::default(),
            custom_profiles: None,
        }
    }
}

/// Load configuration from `explicit_path`, or discover it when `None`.
///
/// Fails without a partial result: either every source merges and every
/// custom profile resolves, or an error is returned.
pub fn load_config(explicit_path: Option<&Path>) -> Result<MergedConfig, ConfigError> {
    match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            load_sources(&[path.to_path_buf()])
        }
        None => load_config_with(&ConfigDiscovery::from_env()),
    }
}

/// Load configuration from the locations described by `discovery`.
pub fn load_config_with(discovery: &ConfigDiscovery) -> Result<MergedConfig, ConfigError> {
    load_sources(&discovery.config_files())
}

/// Fold `paths` (lowest precedence first) over the defaults.
pub fn load_sources(paths: &[PathBuf]) -> Result<MergedConfig, ConfigError> {
    let mut config = MergedConfig::default();
    let mut raw_profiles = BTreeMap::new();

    for path in paths {
        let data = read_source(path)?;
        apply_source(&mut config, &mut raw_profiles, &data)?;
        info!(path = %path.display(), "loaded config");
    }

    if !raw_profiles.is_empty() {
        debug!(count = raw_profiles.len(), "resolving custom profiles");
        config.custom_profiles = Some(resolve_custom_profiles(raw_profiles)?);
    }

    Ok(config)
}
