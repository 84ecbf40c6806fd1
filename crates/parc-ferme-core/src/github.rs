//! GitHub access through the `gh` CLI.
//!
//! PR metadata, diffs and comments are fetched by shelling out to `gh`,
//! which owns authentication. Every call is bounded by [`GH_TIMEOUT`].

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GitHubError, ToolError};
use crate::process::{run_command, CommandOutput, ProcessError};

/// Upper bound for a single `gh` invocation.
pub const GH_TIMEOUT: Duration = Duration::from_secs(30);

static PR_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));
static PR_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://github\.com/[\w.\-]+/[\w.\-]+/pull/\d+$").expect("valid regex")
});
static REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.\-]+/[\w.\-]+$").expect("valid regex"));

/// PR metadata shown in the header and fed into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrInfo {
    pub title: String,
    pub number: u64,
    pub url: String,
    pub author: String,
    pub base_branch: String,
}

#[derive(Deserialize)]
struct PrView {
    title: String,
    number: u64,
    url: String,
    author: PrAuthor,
    #[serde(rename = "baseRefName")]
    base_ref_name: String,
}

#[derive(Deserialize)]
struct PrAuthor {
    login: String,
}

impl From<PrView> for PrInfo {
    fn from(view: PrView) -> Self {
        Self {
            title: view.title,
            number: view.number,
            url: view.url,
            author: view.author.login,
            base_branch: view.base_ref_name,
        }
    }
}

/// Accept a bare PR number or a `https://github.com/<owner>/<repo>/pull/<n>` URL.
pub fn validate_pr_reference(pr: &str) -> Result<(), GitHubError> {
    if PR_NUMBER_RE.is_match(pr) || PR_URL_RE.is_match(pr) {
        Ok(())
    } else {
        Err(GitHubError::InvalidPrReference(pr.to_string()))
    }
}

/// Accept `OWNER/REPO`.
pub fn validate_repo(repo: &str) -> Result<(), GitHubError> {
    if REPO_RE.is_match(repo) {
        Ok(())
    } else {
        Err(GitHubError::InvalidRepo(repo.to_string()))
    }
}

/// Check that `gh` is on `PATH`.
pub fn check_gh_available() -> Result<(), ToolError> {
    which::which("gh").map(|_| ()).map_err(|_| ToolError::NotFound {
        tool: "gh",
        hint: "Install it from https://cli.github.com/",
    })
}

/// Thin client over the `gh` CLI, optionally pinned to one repository.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    program: PathBuf,
    repo: Option<String>,
    timeout: Duration,
}

impl GitHubClient {
    /// Create a client; `repo` is validated and passed to `gh` as `-R`.
    pub fn new(repo: Option<String>) -> Result<Self, GitHubError> {
        if let Some(repo) = &repo {
            validate_repo(repo)?;
        }
        Ok(Self {
            program: PathBuf::from("gh"),
            repo,
            timeout: GH_TIMEOUT,
        })
    }

    /// Use a different `gh` executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn get_pr_info(&self, pr: &str) -> Result<PrInfo, GitHubError> {
        validate_pr_reference(pr)?;
        let output = self
            .run(&[
                "pr",
                "view",
                pr,
                "--json",
                "title,number,url,author,baseRefName",
            ])
            .await?;
        if !output.success {
            return Err(GitHubError::PrNotFound {
                pr: pr.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        let view: PrView = serde_json::from_str(&output.stdout)?;
        Ok(view.into())
    }

    pub async fn get_pr_diff(&self, pr: &str) -> Result<String, GitHubError> {
        validate_pr_reference(pr)?;
        let output = self.run(&["pr", "diff", pr]).await?;
        if !output.success {
            return Err(GitHubError::PrNotFound {
                pr: pr.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Paths touched by the PR. A failing `gh` call is logged and yields an
    /// empty list, since the file list is informational only.
    pub async fn get_changed_files(&self, pr: &str) -> Result<Vec<String>, GitHubError> {
        validate_pr_reference(pr)?;
        let output = self.run(&["pr", "diff", pr, "--name-only"]).await?;
        if !output.success {
            warn!(
                pr = %pr,
                stderr = %output.stderr.trim(),
                "could not list changed files"
            );
            return Ok(Vec::new());
        }
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Post `body` as a PR comment, or edit the last one when `edit_last`.
    ///
    /// The body goes through a temporary file so it is never subject to
    /// argument-length limits or shell quoting.
    pub async fn post_comment(
        &self,
        pr: &str,
        body: &str,
        edit_last: bool,
    ) -> Result<(), GitHubError> {
        validate_pr_reference(pr)?;

        let mut body_file = tempfile::Builder::new()
            .prefix("parc-ferme-")
            .suffix(".md")
            .tempfile()?;
        body_file.write_all(body.as_bytes())?;
        body_file.flush()?;

        let mut args: Vec<OsString> = vec![
            "pr".into(),
            "comment".into(),
            pr.into(),
            "--body-file".into(),
            body_file.path().into(),
        ];
        if edit_last {
            args.push("--edit-last".into());
        }

        let output = self.run(&args).await?;
        if !output.success {
            return Err(GitHubError::CommandFailed {
                action: "posting comment".to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }

    async fn run<S: AsRef<std::ffi::OsStr>>(
        &self,
        args: &[S],
    ) -> Result<CommandOutput, GitHubError> {
        let mut full: Vec<OsString> = args.iter().map(|a| a.as_ref().to_os_string()).collect();
        if let Some(repo) = &self.repo {
            full.push("-R".into());
            full.push(repo.into());
        }

        let command = describe_command(&full);
        debug!(command = %command, "running gh");

        run_command(self.program.as_os_str(), &full, None, self.timeout)
            .await
            .map_err(|e| match e {
                ProcessError::TimedOut { timeout, .. } => GitHubError::Timeout {
                    command,
                    secs: timeout.as_secs(),
                },
                ProcessError::Spawn { source, .. } | ProcessError::Io { source, .. } => {
                    GitHubError::Io(source)
                }
            })
    }
}

/// `gh` plus its first three arguments, for timeout messages.
fn describe_command(args: &[OsString]) -> String {
    std::iter::once("gh".to_string())
        .chain(args.iter().take(3).map(|a| a.to_string_lossy().into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}
