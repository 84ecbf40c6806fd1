//! Config file discovery.
//!
//! Two optional locations, lowest precedence first:
//! 1. User config (`~/.config/parc-ferme/.reviewrc.yml`)
//! 2. Project config (`.reviewrc.yml` at the git root, or the cwd outside a repo)

use std::path::PathBuf;

use tracing::debug;

use crate::git::find_git_root;

/// File name looked up in both the user and project locations.
pub const CONFIG_FILENAME: &str = ".reviewrc.yml";

/// Per-user config directory (`~/.config/parc-ferme`).
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("parc-ferme"))
}

/// Where to look for config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiscovery {
    pub user_config_dir: Option<PathBuf>,
    pub project_dir: PathBuf,
}

impl ConfigDiscovery {
    pub fn new(user_config_dir: Option<PathBuf>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            user_config_dir,
            project_dir: project_dir.into(),
        }
    }

    /// Locations for the current process: the user's home config dir and the
    /// git root of the working directory (or the working directory itself).
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_dir = find_git_root(&cwd).unwrap_or(cwd);
        Self::new(user_config_dir(), project_dir)
    }

    /// Existing config files, lowest precedence first.
    pub fn config_files(&self) -> Vec<PathBuf> {
        let candidates = self
            .user_config_dir
            .iter()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .chain(std::iter::once(self.project_dir.join(CONFIG_FILENAME)));

        candidates
            .filter(|path| {
                let exists = path.is_file();
                debug!(path = %path.display(), exists, "config candidate");
                exists
            })
            .collect()
    }
}
