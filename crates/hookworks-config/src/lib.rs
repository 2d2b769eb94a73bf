//! KDL configuration parsing for hookworks.
//!
//! This crate handles parsing of the per-repository configuration overlay
//! (`.hookworks.kdl`) that repositories use to customize their build.

pub mod error;
pub mod repo;

pub use error::{ConfigError, ConfigResult};
pub use repo::{CONFIG_FILENAME, DEFAULT_DEPLOY, RepoConfig, load_repo_config, parse_repo_config};
