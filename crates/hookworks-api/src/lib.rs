//! Webhook gateway for hookworks.
//!
//! Receives push notifications from a Git provider, checks them against the
//! owner allowlist, and submits build jobs. Everything about a build beyond
//! that happens behind the scheduler's `JobSender::submit` contract.

pub mod error;
pub mod routes;
pub mod state;

pub use state::{AppState, Settings};
