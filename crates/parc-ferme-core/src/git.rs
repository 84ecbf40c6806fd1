//! Git integration used to locate the project config.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

/// Upper bound on how long `git rev-parse` may take during config discovery.
pub const GIT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Find the top level of the git work tree containing `dir`.
///
/// Runs `git rev-parse --show-toplevel`. Any failure (git missing, not a
/// repository, timeout) yields `None`; discovery never errors.
pub fn find_git_root(dir: &Path) -> Option<PathBuf> {
    let mut cmd = Command::new("git");
    cmd.args(["rev-parse", "--show-toplevel"]).current_dir(dir);

    let output = match run_with_timeout(&mut cmd, GIT_DISCOVERY_TIMEOUT) {
        Ok(output) => output,
        Err(e) => {
            debug!(error = %e, dir = %dir.display(), "git root discovery unavailable");
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if root.is_empty() {
        return None;
    }
    Some(PathBuf::from(root))
}

/// Spawn `cmd` and wait at most `timeout` for it, killing it on expiry.
fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> io::Result<Output> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            if let Some(mut out) = child.stdout.take() {
                out.read_to_end(&mut stdout)?;
            }
            if let Some(mut err) = child.stderr.take() {
                err.read_to_end(&mut stderr)?;
            }
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }
        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("command timed out after {timeout:?}"),
            ));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    /// A fresh repository in a temp dir, with `depth` nested subdirectories.
    fn repo_with_nested_dir(depth: usize) -> (tempfile::TempDir, PathBuf) {
        let repo = tempfile::tempdir().unwrap();
        let status = StdCommand::new("git")
            .args(["init", "--quiet"])
            .current_dir(repo.path())
            .status()
            .unwrap();
        assert!(status.success(), "git init failed in {}", repo.path().display());

        let nested = (0..depth).fold(repo.path().to_path_buf(), |dir, i| dir.join(format!("d{i}")));
        std::fs::create_dir_all(&nested).unwrap();
        (repo, nested)
    }

    #[test]
    fn find_git_root_from_subdirectory() {
        let (repo, nested) = repo_with_nested_dir(2);

        let root = find_git_root(&nested).expect("should find repo root");
        assert_eq!(
            root.canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn find_git_root_none_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_git_root(dir.path()).is_none());
    }

    #[test]
    fn find_git_root_none_for_missing_dir() {
        assert!(find_git_root(Path::new("/definitely/not/a/real/dir")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn run_with_timeout_kills_slow_command() {
        let mut cmd = StdCommand::new("sleep");
        cmd.arg("5");
        let err = run_with_timeout(&mut cmd, Duration::from_millis(100)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }
}
