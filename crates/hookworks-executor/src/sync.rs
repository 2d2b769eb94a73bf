//! Repository synchronization: clone or fetch + reset.

use crate::BuildLog;
use crate::shell::{ExecError, run_argv};
use std::path::PathBuf;
use tracing::info;

/// Store of working copies, one directory per job name.
#[derive(Debug, Clone)]
pub struct RepoStore {
    root: PathBuf,
}

/// How a working copy will be brought up to date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPlan {
    /// No working copy yet: clone fresh.
    Clone { url: String, dest: PathBuf },
    /// Working copy exists: fetch, then hard-reset to the remote's default
    /// branch tip.
    Update { dest: PathBuf },
}

impl RepoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the working copy for a job name.
    pub fn working_copy(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Decide between a fresh clone and an update of an existing copy.
    pub fn plan(&self, name: &str, clone_url: &str) -> SyncPlan {
        let dest = self.working_copy(name);
        if dest.exists() {
            SyncPlan::Update { dest }
        } else {
            SyncPlan::Clone {
                url: clone_url.to_string(),
                dest,
            }
        }
    }

    /// Bring the working copy for `name` up to date with its remote and
    /// return its path.
    ///
    /// Local modifications are discarded: the working copy is disposable and
    /// never hand-edited. Creates the repositories root on first use. Every
    /// invoked command line is written to `log` before execution. Any
    /// failure is fatal for the calling job only; no retry is attempted.
    pub async fn sync(
        &self,
        name: &str,
        clone_url: &str,
        log: &mut BuildLog,
    ) -> Result<PathBuf, ExecError> {
        tokio::fs::create_dir_all(&self.root).await?;

        match self.plan(name, clone_url) {
            SyncPlan::Clone { url, dest } => {
                info!(name = %name, url = %url, "Cloning repository");
                let dest_str = dest.to_string_lossy();
                run_argv("git", &["clone", &url, &dest_str], None, log).await?;
                Ok(dest)
            }
            SyncPlan::Update { dest } => {
                info!(name = %name, "Updating repository");
                run_argv("git", &["fetch"], Some(&dest), log).await?;
                // origin/HEAD tracks whatever default branch the remote
                // advertised at clone time.
                run_argv("git", &["reset", "--hard", "origin/HEAD"], Some(&dest), log).await?;
                Ok(dest)
            }
        }
    }
}
