//! Error taxonomy for parc-ferme.
//!
//! Every error here is user-facing and non-retryable; messages carry the
//! offending path, profile name or value so the user can fix their setup.

use std::path::PathBuf;

/// Errors raised while discovering, reading or merging configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("config file must be a mapping at the top level: {}", .0.display())]
    NotAMapping(PathBuf),

    #[error("invalid YAML in {}: {source}", path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid review_timeout value: '{value}' (must be a positive integer)")]
    InvalidTimeout { value: String },

    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("could not resolve profiles (circular or missing extends?): {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Raised when a caller asks for a profile that does not exist.
#[derive(Debug, thiserror::Error)]
pub enum ProfileLookupError {
    #[error("unknown profile '{name}'. Available: {}", .available.join(", "))]
    Unknown { name: String, available: Vec<String> },
}

/// A required external CLI is missing from `PATH`.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("'{tool}' CLI not found. {hint}")]
    NotFound { tool: &'static str, hint: &'static str },
}

/// Errors talking to GitHub through the `gh` CLI.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error(
        "invalid PR reference: '{0}'. Expected a PR number (e.g. 123) or GitHub URL \
         (e.g. https://github.com/owner/repo/pull/123)"
    )]
    InvalidPrReference(String),

    #[error("invalid repository format: '{0}'. Expected OWNER/REPO (e.g. 'owner/my-repo')")]
    InvalidRepo(String),

    #[error("could not find PR '{pr}': {stderr}")]
    PrNotFound { pr: String, stderr: String },

    #[error("timed out after {secs}s waiting for: {command}")]
    Timeout { command: String, secs: u64 },

    #[error("{action} failed: {stderr}")]
    CommandFailed { action: String, stderr: String },

    #[error("unexpected gh output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the Claude review invocation.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error(
        "Claude review timed out after {secs}s. \
         Try increasing --timeout or review_timeout in config"
    )]
    Timeout { secs: u64 },

    #[error("Claude review failed: {0}")]
    Failed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for callers that drive a whole review run.
#[derive(Debug, thiserror::Error)]
pub enum ParcFermeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ProfileLookup(#[from] ProfileLookupError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// Result type for parc-ferme operations.
pub type Result<T> = std::result::Result<T, ParcFermeError>;
