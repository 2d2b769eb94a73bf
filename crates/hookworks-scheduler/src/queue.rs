//! Unbounded FIFO hand-off between job submitters and the build worker.
//!
//! The queue is the only synchronization point in the system: any number of
//! concurrent producers, exactly one consumer. No capacity bound; unbounded
//! growth under sustained submission is an accepted resource-exhaustion
//! risk, not mitigated here.

use hookworks_core::BuildJob;
use thiserror::Error;
use tokio::sync::mpsc;

/// Queue errors. Never expected in normal operation: a closed queue means
/// the worker task is gone and the liveness guarantee no longer holds, so
/// callers should treat this as fatal rather than drop the job silently.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("job queue is closed, worker is gone (job {})", .0.name)]
    Closed(BuildJob),
}

/// Producer half of the queue. Cheap to clone; one per submitter.
#[derive(Debug, Clone)]
pub struct JobSender(mpsc::UnboundedSender<BuildJob>);

impl JobSender {
    /// Submit a job. Non-blocking: returns before the job's synchronization
    /// or build stage has run.
    pub fn submit(&self, job: BuildJob) -> Result<(), QueueError> {
        self.0.send(job).map_err(|e| QueueError::Closed(e.0))
    }
}

/// Consumer half of the queue, owned by exactly one worker.
#[derive(Debug)]
pub struct JobReceiver(mpsc::UnboundedReceiver<BuildJob>);

impl JobReceiver {
    /// Wait for the next job in submission order.
    ///
    /// Returns `None` only after every sender has been dropped and all
    /// queued jobs have been drained; no job is ever dropped or reordered.
    pub async fn recv(&mut self) -> Option<BuildJob> {
        self.0.recv().await
    }
}

/// Create a connected queue pair.
pub fn channel() -> (JobSender, JobReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (JobSender(tx), JobReceiver(rx))
}
