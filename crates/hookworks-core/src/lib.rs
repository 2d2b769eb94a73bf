//! Core domain types for the hookworks build runner.
//!
//! This crate contains:
//! - Build job types
//! - Push event parsing for provider webhooks
//! - Common error types

pub mod error;
pub mod event;
pub mod job;

pub use error::{Error, Result};
pub use event::PushEvent;
pub use job::BuildJob;
