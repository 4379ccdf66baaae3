//! Worker lifecycle: create, submit, delete.

use std::fmt::Display;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::consts::SUBMIT_WAIT_MS;
use crate::queue::ToneQueue;
use crate::request::ToneRequest;

/// Owning handle for the tone queue and the playback worker.
///
/// Both resources start absent. [`Beeper::create`] builds them together and
/// [`Beeper::delete`] tears them down together; either call is safe to
/// repeat and safe after the other partially failed.
pub struct Beeper {
    queue: Option<Arc<ToneQueue>>,
    worker: Option<JoinHandle<()>>,
}

impl Beeper {
    pub const fn new() -> Self {
        Self {
            queue: None,
            worker: None,
        }
    }

    /// Create the queue (if absent), then spawn the worker (if absent).
    ///
    /// `spawn_worker` receives the queue handle and must start a thread
    /// running [`crate::player::run`] on it. If spawning fails, the queue
    /// is torn down as well so requests never pile up with no consumer;
    /// the caller may retry `create` later.
    pub fn create<E: Display>(
        &mut self,
        spawn_worker: impl FnOnce(Arc<ToneQueue>) -> Result<JoinHandle<()>, E>,
    ) {
        let queue = match &self.queue {
            Some(queue) => Arc::clone(queue),
            None => {
                let queue = Arc::new(ToneQueue::new());
                self.queue = Some(Arc::clone(&queue));
                queue
            }
        };

        if self.worker.is_none() {
            match spawn_worker(queue) {
                Ok(handle) => {
                    self.worker = Some(handle);
                    log::info!("beeper worker created");
                }
                Err(err) => {
                    log::error!("failed to spawn beeper worker: {err}");
                    self.delete();
                }
            }
        }
    }

    /// Submit a request. Returns whether it was accepted.
    ///
    /// Rejects invalid requests, rejects while the worker is absent (before
    /// `create`, after `delete`), and rejects after a short bounded wait on
    /// a full queue.
    pub fn send(&self, request: ToneRequest) -> bool {
        if !request.is_valid() {
            return false;
        }
        match (&self.queue, &self.worker) {
            (Some(queue), Some(_)) => {
                queue.try_send(request, Duration::from_millis(SUBMIT_WAIT_MS))
            }
            _ => false,
        }
    }

    /// Tear down the worker and the queue.
    ///
    /// Pending requests are discarded; the sequence currently playing
    /// finishes before the worker observes the close. Idempotent.
    pub fn delete(&mut self) {
        if let Some(queue) = self.queue.take() {
            queue.close();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("beeper worker panicked during teardown");
            }
        }
    }

    /// Whether both the queue and the worker are present.
    pub fn is_created(&self) -> bool {
        self.queue.is_some() && self.worker.is_some()
    }
}

impl Default for Beeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Beeper {
    fn drop(&mut self) {
        self.delete();
    }
}
