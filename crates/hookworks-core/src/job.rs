//! Build job types.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One unit of work: synchronize one repository and run its deploy command
/// once.
///
/// Created by the gateway when a push event is accepted, consumed exactly
/// once by the build worker. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildJob {
    /// Filesystem-safe identifier. Names both the working-copy directory and
    /// the log file prefix; stable for a given owner and repository.
    pub name: String,
    /// Git clone URL for the repository.
    pub clone_url: String,
}

impl BuildJob {
    /// Create a job, rejecting names that cannot safely name a directory.
    pub fn new(name: impl Into<String>, clone_url: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidInput("job name is empty".to_string()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::InvalidInput(format!(
                "job name is not filesystem-safe: {}",
                name
            )));
        }
        Ok(Self {
            name,
            clone_url: clone_url.into(),
        })
    }
}
