//! Serial execution context
//!
//! One named worker thread drains a channel of jobs in submission order,
//! so two jobs on the same queue never run concurrently.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam::channel::{self, SendError, Sender};
use tracing::{debug, error, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// FIFO queue backed by a dedicated thread
pub struct SerialQueue {
    label: String,
    sender: Sender<Job>,
}

impl SerialQueue {
    /// Spawn the worker thread
    pub fn new(label: impl Into<String>) -> io::Result<Self> {
        let label = label.into();
        let (sender, receiver) = channel::unbounded::<Job>();

        let worker_label = label.clone();
        thread::Builder::new().name(label.clone()).spawn(move || {
            for job in receiver {
                if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                    error!(queue = %worker_label, "Job panicked, continuing with next job");
                }
            }
            debug!(queue = %worker_label, "Queue closed");
        })?;

        Ok(Self { label, sender })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Enqueue `job` behind every job already submitted.
    ///
    /// If the worker is gone the job runs on the calling thread instead and
    /// `false` is returned, so callbacks captured by the job still fire.
    pub fn dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.sender.send(Box::new(job)) {
            Ok(()) => true,
            Err(SendError(job)) => {
                warn!(queue = %self.label, "Worker unavailable, running job inline");
                job();
                false
            }
        }
    }
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialQueue").field("label", &self.label).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
