//! Per-build log files.

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Directory holding one log file per build attempt.
#[derive(Debug, Clone)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Open a fresh log for one build attempt.
    ///
    /// Creates the logs root on first use. The file name combines the job
    /// name with a sub-second timestamp so back-to-back builds of the same
    /// repository get distinct files; a name collision is an error rather
    /// than two builds sharing a file.
    pub fn open(&self, name: &str) -> io::Result<BuildLog> {
        std::fs::create_dir_all(&self.root)?;
        let ts = Local::now().format("%Y-%m-%d-%H-%M-%S-%f");
        let path = self.root.join(format!("{}-{}.log", name, ts));
        let file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&path)?;
        Ok(BuildLog { file, path })
    }
}

/// Append-only log bound to one job execution.
///
/// Written to by repository sync and the build command, flushed after each
/// logical write, closed when dropped.
#[derive(Debug)]
pub struct BuildLog {
    file: File,
    path: PathBuf,
}

impl BuildLog {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the command line about to be executed.
    pub fn command_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "$ {}", line)?;
        self.file.flush()
    }

    /// Record a free-form line (used for error records).
    pub fn note(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{}", line)?;
        self.file.flush()
    }

    /// Stdout and stderr handles for a subprocess, both appending to this
    /// log so the two streams interleave in real time.
    pub fn stdio(&self) -> io::Result<(Stdio, Stdio)> {
        Ok((
            Stdio::from(self.file.try_clone()?),
            Stdio::from(self.file.try_clone()?),
        ))
    }
}
