//! Non-blocking backend teardown
//!
//! Backends that may block on exit are shut down on a detached worker
//! thread. The caller gets a [`ShutdownHandle`] it may wait on with its own
//! timeout, or simply drop.

use std::time::{Duration, Instant};
use tokio::sync::oneshot;

const SETTLE_STEP: Duration = Duration::from_millis(1);

enum Progress {
    Complete,
    Pending(oneshot::Receiver<()>),
}

/// Completion handle for a tracker teardown
pub struct ShutdownHandle {
    progress: Progress,
    grace: Duration,
}

impl ShutdownHandle {
    pub(crate) fn complete(grace: Duration) -> Self {
        Self {
            progress: Progress::Complete,
            grace,
        }
    }

    /// Run `shutdown` for `backend` inline, or on a worker thread when the
    /// backend says it may block.
    pub(crate) fn retire<B, F>(
        backend: Box<B>,
        may_block: bool,
        grace: Duration,
        shutdown: F,
    ) -> Self
    where
        B: ?Sized + Send + 'static,
        F: FnOnce(&mut B) + Send + 'static,
    {
        let mut backend = backend;
        if !may_block {
            shutdown(&mut *backend);
            drop(backend);
            tracing::debug!("Backend shut down inline");
            return Self::complete(grace);
        }

        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name("tracker-shutdown".to_string())
            .spawn(move || {
                shutdown(&mut *backend);
                drop(backend);
                tracing::debug!("Backend shut down on worker thread");
                let _ = tx.send(());
            });

        match spawned {
            Ok(_) => Self {
                progress: Progress::Pending(rx),
                grace,
            },
            Err(e) => {
                tracing::error!("Failed to spawn shutdown worker: {}", e);
                Self::complete(grace)
            }
        }
    }

    /// Whether the backend finished shutting down
    pub fn is_complete(&mut self) -> bool {
        let done = match &mut self.progress {
            Progress::Complete => return true,
            Progress::Pending(rx) => match rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => true,
                Err(oneshot::error::TryRecvError::Empty) => false,
            },
        };
        if done {
            self.progress = Progress::Complete;
        }
        done
    }

    /// Wait up to `timeout` for the backend to finish. Returns whether it did.
    pub async fn wait(self, timeout: Duration) -> bool {
        match self.progress {
            Progress::Complete => true,
            Progress::Pending(rx) => tokio::time::timeout(timeout, rx).await.is_ok(),
        }
    }

    /// Block for at most the configured grace period while the backend
    /// finishes. Returns whether it did.
    ///
    /// Useful for keeping a worker's final log lines ahead of the caller's.
    pub fn settle(&mut self) -> bool {
        let deadline = Instant::now() + self.grace;
        loop {
            if self.is_complete() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep(SETTLE_STEP.min(deadline - now));
        }
    }
}

impl std::fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.progress {
            Progress::Complete => "complete",
            Progress::Pending(_) => "pending",
        };
        f.debug_struct("ShutdownHandle")
            .field("state", &state)
            .field("grace", &self.grace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct Worker {
        done: Arc<AtomicBool>,
        delay: Duration,
    }

    fn finish(worker: &mut Worker) {
        std::thread::sleep(worker.delay);
        worker.done.store(true, Ordering::SeqCst);
    }

    #[test]
    fn test_inline_shutdown_is_complete() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = Box::new(Worker {
            done: done.clone(),
            delay: Duration::ZERO,
        });

        let mut handle = ShutdownHandle::retire(worker, false, Duration::from_millis(5), finish);
        assert!(done.load(Ordering::SeqCst));
        assert!(handle.is_complete());
    }

    #[test]
    fn test_blocking_shutdown_does_not_block_caller() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = Box::new(Worker {
            done: done.clone(),
            delay: Duration::from_secs(5),
        });

        let started = Instant::now();
        let mut handle = ShutdownHandle::retire(worker, true, Duration::from_millis(20), finish);
        assert!(!handle.settle());
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_wait_reports_completion() {
        let done = Arc::new(AtomicBool::new(false));
        let worker = Box::new(Worker {
            done: done.clone(),
            delay: Duration::from_millis(10),
        });

        let handle = ShutdownHandle::retire(worker, true, Duration::from_millis(1), finish);
        assert!(handle.wait(Duration::from_secs(5)).await);
        assert!(done.load(Ordering::SeqCst));
    }
}
