//! Subprocess execution and log capture for hookworks builds.
//!
//! This crate contains:
//! - Per-build log files (`LogDir`, `BuildLog`)
//! - Shell and argv subprocess execution with combined output capture
//! - Repository synchronization (clone or fetch + reset)

pub mod logs;
pub mod shell;
pub mod sync;

pub use logs::{BuildLog, LogDir};
pub use shell::{ExecError, run_argv, run_shell};
pub use sync::{RepoStore, SyncPlan};
