//! Job scheduling for hookworks: the FIFO queue and the single build worker.

pub mod queue;
pub mod worker;

pub use queue::{JobReceiver, JobSender, QueueError, channel};
pub use worker::{BuildService, JobOutcome, Worker};
