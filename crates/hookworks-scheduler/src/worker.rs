//! The single build worker: pulls one job at a time and drives repository
//! sync, configuration load, and the deploy command.

use crate::queue::{JobReceiver, JobSender, channel};
use hookworks_config::{ConfigError, load_repo_config};
use hookworks_core::BuildJob;
use hookworks_executor::{ExecError, LogDir, RepoStore, run_shell};
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Tagged outcome of one job. Each pipeline stage fails distinctly so the
/// process log can say which stage broke.
#[derive(Debug)]
pub enum JobOutcome {
    Success,
    SyncFailed(ExecError),
    ConfigFailed(ConfigError),
    BuildFailed(ExecError),
}

/// The long-lived consumer of the job queue.
///
/// Processes at most one job at a time, in submission order; the next job
/// never starts until the current one's log is closed. A job's failure never
/// stops the loop, so one broken repository cannot stall builds for any
/// other.
pub struct Worker {
    jobs: JobReceiver,
    repos: RepoStore,
    logs: LogDir,
}

impl Worker {
    /// Build a worker rooted at a data directory: working copies live under
    /// `repo/`, build logs under `log/`.
    pub fn new(data_dir: &Path, jobs: JobReceiver) -> Self {
        Self {
            jobs,
            repos: RepoStore::new(data_dir.join("repo")),
            logs: LogDir::new(data_dir.join("log")),
        }
    }

    /// Run until the queue is closed and drained.
    pub async fn run(mut self) {
        info!("Starting build worker");
        while let Some(job) = self.jobs.recv().await {
            info!(name = %job.name, "Building");
            match self.handle(&job).await {
                Ok(JobOutcome::Success) => {
                    info!(name = %job.name, "Build succeeded");
                }
                Ok(JobOutcome::SyncFailed(e)) => {
                    error!(name = %job.name, error = %e, "Repository sync failed");
                }
                Ok(JobOutcome::ConfigFailed(e)) => {
                    error!(name = %job.name, error = %e, "Configuration overlay is malformed");
                }
                Ok(JobOutcome::BuildFailed(e)) => {
                    error!(name = %job.name, error = %e, "Deploy command failed");
                }
                Err(e) => {
                    error!(name = %job.name, error = %e, "Build log failure");
                }
            }
        }
        info!("Job queue closed, build worker exiting");
    }

    /// Execute one job: open its log, sync the repository, load the overlay,
    /// run the deploy command.
    ///
    /// Each stage failure is recorded in the job's own log and mapped to a
    /// tagged outcome. The log is closed on every path out of this function.
    /// The only error this returns is a failure of the log sink itself.
    async fn handle(&self, job: &BuildJob) -> std::io::Result<JobOutcome> {
        let mut log = self.logs.open(&job.name)?;

        let working_copy = match self.repos.sync(&job.name, &job.clone_url, &mut log).await {
            Ok(path) => path,
            Err(e) => {
                log.note(&format!("sync failed: {}", e))?;
                return Ok(JobOutcome::SyncFailed(e));
            }
        };

        let config = match load_repo_config(&working_copy) {
            Ok(config) => config,
            Err(e) => {
                log.note(&format!("config failed: {}", e))?;
                return Ok(JobOutcome::ConfigFailed(e));
            }
        };

        if let Err(e) = run_shell(&config.deploy, &working_copy, &mut log).await {
            log.note(&format!("deploy failed: {}", e))?;
            return Ok(JobOutcome::BuildFailed(e));
        }

        Ok(JobOutcome::Success)
    }
}

/// The build service: owns the queue's producer half and the background
/// worker task.
///
/// Constructed once at startup and handed to request handlers by explicit
/// injection; there is no lazily-created global worker.
pub struct BuildService {
    jobs: JobSender,
    task: JoinHandle<()>,
}

impl BuildService {
    /// Spawn the worker and return the running service.
    pub fn start(data_dir: &Path) -> Self {
        let (jobs, rx) = channel();
        let worker = Worker::new(data_dir, rx);
        let task = tokio::spawn(worker.run());
        Self { jobs, task }
    }

    /// Handle for submitting jobs.
    pub fn jobs(&self) -> JobSender {
        self.jobs.clone()
    }

    /// Stop accepting jobs and wait for all queued work to finish.
    pub async fn drain(self) -> Result<(), tokio::task::JoinError> {
        drop(self.jobs);
        self.task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookworks_config::CONFIG_FILENAME;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("hookworks-worker-{}-{}", name, std::process::id()));
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn git(args: &[&str], cwd: &Path) {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(cwd)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Create a source repository with one commit, optionally carrying a
    /// configuration overlay.
    fn init_source_repo(dir: &Path, overlay: Option<&str>) -> String {
        std::fs::create_dir_all(dir).unwrap();
        git(&["init", "--quiet"], dir);
        std::fs::write(dir.join("README"), "fixture\n").unwrap();
        if let Some(overlay) = overlay {
            std::fs::write(dir.join(CONFIG_FILENAME), overlay).unwrap();
        }
        git(&["add", "-A"], dir);
        git(
            &[
                "-c",
                "user.name=test",
                "-c",
                "user.email=test@example.com",
                "commit",
                "--quiet",
                "-m",
                "init",
            ],
            dir,
        );
        dir.to_string_lossy().to_string()
    }

    /// Log files for a job name, oldest first. The timestamp format is
    /// zero-padded throughout, so lexical order is chronological order.
    /// An absent logs root means no build has opened a log yet.
    fn logs_for(data_dir: &Path, name: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(data_dir.join("log")) else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = entries
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(&format!("{}-", name))
            })
            .collect();
        paths.sort();
        paths
            .into_iter()
            .map(|p| std::fs::read_to_string(p).unwrap())
            .collect()
    }

    async fn run_jobs(data_dir: &Path, jobs: Vec<BuildJob>) {
        let (tx, rx) = channel();
        for job in jobs {
            tx.submit(job).unwrap();
        }
        drop(tx);
        Worker::new(data_dir, rx).run().await;
    }

    #[tokio::test]
    async fn test_clone_then_update_with_distinct_logs() {
        let dir = scratch_dir("clone-update");
        let url = init_source_repo(&dir.join("source"), Some(r#"deploy "echo built""#));
        let job = BuildJob::new("acme-widgets", &url).unwrap();

        run_jobs(&dir, vec![job.clone(), job]).await;

        let logs = logs_for(&dir, "acme-widgets");
        assert_eq!(logs.len(), 2);

        // First build clones and runs the configured deploy command.
        assert!(logs[0].contains("$ git clone"));
        assert!(logs[0].contains("$ echo built"));
        assert!(logs[0].contains("built"));

        // Second build updates in place, never a second clone.
        assert!(logs[1].contains("$ git fetch"));
        assert!(logs[1].contains("$ git reset --hard origin/HEAD"));
        assert!(!logs[1].contains("$ git clone"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_absent_overlay_uses_default_deploy_command() {
        let dir = scratch_dir("default-deploy");
        let url = init_source_repo(&dir.join("source"), None);

        run_jobs(&dir, vec![BuildJob::new("acme-widgets", &url).unwrap()]).await;

        let logs = logs_for(&dir, "acme-widgets");
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("$ make deploy"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_failed_build_does_not_block_the_next_job() {
        let dir = scratch_dir("failed-build");
        let bad = init_source_repo(&dir.join("bad-source"), Some(r#"deploy "exit 1""#));
        let good = init_source_repo(&dir.join("good-source"), Some(r#"deploy "echo second ok""#));

        run_jobs(
            &dir,
            vec![
                BuildJob::new("acme-broken", &bad).unwrap(),
                BuildJob::new("acme-fine", &good).unwrap(),
            ],
        )
        .await;

        let broken = logs_for(&dir, "acme-broken");
        assert_eq!(broken.len(), 1);
        assert!(broken[0].contains("$ exit 1"));
        assert!(broken[0].contains("deploy failed"));

        let fine = logs_for(&dir, "acme-fine");
        assert_eq!(fine.len(), 1);
        assert!(fine[0].contains("second ok"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_sync_failure_is_isolated_to_its_job() {
        let dir = scratch_dir("failed-sync");
        let good = init_source_repo(&dir.join("source"), Some(r#"deploy "echo still alive""#));

        run_jobs(
            &dir,
            vec![
                BuildJob::new("acme-missing", "/nonexistent/remote.git").unwrap(),
                BuildJob::new("acme-fine", &good).unwrap(),
            ],
        )
        .await;

        let missing = logs_for(&dir, "acme-missing");
        assert_eq!(missing.len(), 1);
        assert!(missing[0].contains("$ git clone /nonexistent/remote.git"));
        assert!(missing[0].contains("sync failed"));

        let fine = logs_for(&dir, "acme-fine");
        assert_eq!(fine.len(), 1);
        assert!(fine[0].contains("still alive"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_malformed_overlay_fails_the_job_but_not_the_worker() {
        let dir = scratch_dir("bad-overlay");
        let bad = init_source_repo(&dir.join("bad-source"), Some(r#"deploy "unterminated"#));
        let good = init_source_repo(&dir.join("good-source"), Some(r#"deploy "echo ok""#));

        run_jobs(
            &dir,
            vec![
                BuildJob::new("acme-bad-overlay", &bad).unwrap(),
                BuildJob::new("acme-fine", &good).unwrap(),
            ],
        )
        .await;

        let bad_logs = logs_for(&dir, "acme-bad-overlay");
        assert_eq!(bad_logs.len(), 1);
        assert!(bad_logs[0].contains("config failed"));
        // The deploy command never ran.
        assert!(!bad_logs[0].contains("$ make deploy"));

        let fine = logs_for(&dir, "acme-fine");
        assert_eq!(fine.len(), 1);
        assert!(fine[0].contains("ok"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_second_job_starts_only_after_first_log_closes() {
        let dir = scratch_dir("serialized");
        let slow = init_source_repo(&dir.join("slow-source"), Some(r#"deploy "sleep 1""#));
        let fast = init_source_repo(&dir.join("fast-source"), Some(r#"deploy "echo fast done""#));

        let service = BuildService::start(&dir);
        let jobs = service.jobs();
        jobs.submit(BuildJob::new("acme-slow", &slow).unwrap())
            .unwrap();
        jobs.submit(BuildJob::new("acme-fast", &fast).unwrap())
            .unwrap();
        drop(jobs);

        // Both submissions returned while the first build had not finished.
        // Wait for the first job's log to appear, proving it is mid-build.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while logs_for(&dir, "acme-slow").is_empty() {
            assert!(
                std::time::Instant::now() < deadline,
                "first job never started"
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        // The first job is still running its deploy command; the second
        // job's log must not exist until the first job's log is closed.
        assert!(logs_for(&dir, "acme-fast").is_empty());

        service.drain().await.unwrap();

        let slow_logs = logs_for(&dir, "acme-slow");
        assert_eq!(slow_logs.len(), 1);
        assert!(slow_logs[0].contains("$ sleep 1"));
        let fast_logs = logs_for(&dir, "acme-fast");
        assert_eq!(fast_logs.len(), 1);
        assert!(fast_logs[0].contains("fast done"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_build_service_accepts_jobs_and_drains() {
        let dir = scratch_dir("service");
        let url = init_source_repo(&dir.join("source"), Some(r#"deploy "echo serviced""#));

        let service = BuildService::start(&dir);
        let jobs = service.jobs();

        // Submission is non-blocking and returns before the build runs.
        jobs.submit(BuildJob::new("acme-widgets", &url).unwrap())
            .unwrap();
        drop(jobs);
        service.drain().await.unwrap();

        let logs = logs_for(&dir, "acme-widgets");
        assert_eq!(logs.len(), 1);
        assert!(logs[0].contains("serviced"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
