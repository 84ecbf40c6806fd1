//! Prompt rendering and the Claude review call.

use std::borrow::Cow;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use crate::config::DEFAULT_REVIEW_TIMEOUT_SECS;
use crate::error::{ReviewError, ToolError};
use crate::format::format_count;
use crate::github::PrInfo;
use crate::process::{run_command, ProcessError};
use crate::profile::Profile;

/// Diffs longer than this many characters are truncated before review.
pub const MAX_DIFF_CHARS: usize = 100_000;

static CRITICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCRITICAL\b").expect("valid regex"));

/// Check that `claude` is on `PATH`.
pub fn check_claude_available() -> Result<(), ToolError> {
    which::which("claude").map(|_| ()).map_err(|_| ToolError::NotFound {
        tool: "claude",
        hint: "Install Claude Code first.",
    })
}

/// Render the review prompt for `pr` under `profile`. The diff itself is
/// sent separately on stdin.
pub fn build_prompt(pr: &PrInfo, profile: &Profile) -> String {
    let mut lines = vec![
        format!("You are a {}. Review this PR diff.", profile.system_role),
        String::new(),
        format!("PR: #{} - {}", pr.number, pr.title),
        format!("Author: {}", pr.author),
        format!("Base branch: {}", pr.base_branch),
        String::new(),
        "RULES:".to_string(),
    ];
    lines.extend(profile.rules.iter().map(|rule| format!("- {rule}")));

    lines.push(String::new());
    lines.push("CHECK FOR:".to_string());
    lines.extend(profile.checks.iter().map(|check| format!("- {check}")));

    lines.push(String::new());
    lines.push("SEVERITY LEVELS:".to_string());
    lines.extend(
        profile
            .severity_levels
            .iter()
            .map(|level| format!("{} {} - {}", level.emoji, level.label, level.description)),
    );

    lines.push(String::new());
    lines.push(format!("FORMAT each issue as:\n{}", profile.output_format));

    if !profile.extra_instructions.is_empty() {
        lines.push(String::new());
        lines.push(profile.extra_instructions.clone());
    }

    lines.join("\n")
}

/// Cut `diff` to `limit` characters and append a notice saying so.
pub fn truncate_diff(diff: &str, limit: usize) -> Cow<'_, str> {
    match diff.char_indices().nth(limit) {
        None => Cow::Borrowed(diff),
        Some((cut, _)) => {
            let limit = format_count(limit);
            Cow::Owned(format!(
                "{}\n\n... [DIFF TRUNCATED: exceeded {limit} characters. \
                 Review covers the first {limit} characters only.] ...\n",
                &diff[..cut]
            ))
        }
    }
}

/// Whether a review flags anything at CRITICAL severity.
pub fn has_critical_issues(review: &str) -> bool {
    CRITICAL_RE.is_match(review)
}

/// Runs `claude -p <prompt>` with the diff on stdin.
#[derive(Debug, Clone)]
pub struct Reviewer {
    program: PathBuf,
    model: Option<String>,
    timeout: Duration,
    max_diff_chars: usize,
}

impl Default for Reviewer {
    fn default() -> Self {
        Self {
            program: PathBuf::from("claude"),
            model: None,
            timeout: Duration::from_secs(DEFAULT_REVIEW_TIMEOUT_SECS),
            max_diff_chars: MAX_DIFF_CHARS,
        }
    }
}

impl Reviewer {
    pub fn new(model: Option<String>, timeout: Duration) -> Self {
        Self {
            model,
            timeout,
            ..Self::default()
        }
    }

    /// Use a different `claude` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_max_diff_chars(mut self, max_diff_chars: usize) -> Self {
        self.max_diff_chars = max_diff_chars;
        self
    }

    /// Review `diff` with `prompt` and return the trimmed review text.
    pub async fn run(&self, prompt: &str, diff: &str) -> Result<String, ReviewError> {
        let diff = truncate_diff(diff, self.max_diff_chars);

        let mut args: Vec<OsString> = vec!["-p".into(), prompt.into()];
        if let Some(model) = &self.model {
            args.push("--model".into());
            args.push(model.into());
        }

        info!(
            model = self.model.as_deref().unwrap_or("default"),
            timeout_secs = self.timeout.as_secs(),
            diff_chars = diff.chars().count(),
            "starting claude review"
        );

        let output = run_command(self.program.as_os_str(), &args, Some(&*diff), self.timeout)
            .await
            .map_err(|e| match e {
                ProcessError::TimedOut { timeout, .. } => ReviewError::Timeout {
                    secs: timeout.as_secs(),
                },
                ProcessError::Spawn { source, .. } | ProcessError::Io { source, .. } => {
                    ReviewError::Io(source)
                }
            })?;

        debug!(duration_ms = output.duration_ms, exit_code = output.exit_code, "claude finished");

        if !output.success {
            return Err(ReviewError::Failed(output.stderr.trim().to_string()));
        }
        Ok(output.stdout.trim().to_string())
    }
}
