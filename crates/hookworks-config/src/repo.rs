//! Per-repository configuration overlay.

use crate::{ConfigError, ConfigResult};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the configuration overlay at the working-copy root.
pub const CONFIG_FILENAME: &str = ".hookworks.kdl";

/// Deploy command used when a repository does not configure one.
pub const DEFAULT_DEPLOY: &str = "make deploy";

/// Per-repository build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Shell command run after synchronization. Free-form text, executed
    /// through a command interpreter; only repositories already permitted to
    /// trigger builds have their overlay honored.
    pub deploy: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            deploy: DEFAULT_DEPLOY.to_string(),
        }
    }
}

/// Load the overlay from a working copy, merging onto defaults.
///
/// An absent file yields the defaults; keys absent from the file keep their
/// default value. The overlay is read fresh on every call since the working
/// copy may have changed. A malformed file is an error; the caller decides
/// what a broken overlay means for the job.
pub fn load_repo_config(working_copy: &Path) -> ConfigResult<RepoConfig> {
    let path = working_copy.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(RepoConfig::default());
    }
    let text = std::fs::read_to_string(&path)?;
    parse_repo_config(&text)
}

/// Parse an overlay document from KDL text.
pub fn parse_repo_config(kdl: &str) -> ConfigResult<RepoConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut config = RepoConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "deploy" => {
                config.deploy =
                    get_first_string_arg(node).ok_or_else(|| ConfigError::InvalidValue {
                        field: "deploy".to_string(),
                        message: "expected a string argument".to_string(),
                    })?;
            }
            _ => {} // Ignore unknown nodes
        }
    }

    Ok(config)
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
