use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tracing::debug;

/// A one-shot callback run after a delay
pub type DeferredTask = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay.
///
/// Scheduling cannot fail and scheduled tasks cannot be cancelled.
pub trait DelayScheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: DeferredTask);
}

/// Runs deferred tasks on the tokio runtime it was created in
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Capture the current tokio runtime
    pub fn from_current() -> Result<Self> {
        let handle = Handle::try_current().context("Delay scheduler requires a tokio runtime")?;
        Ok(Self { handle })
    }
}

impl DelayScheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        debug!("Scheduling deferred task in {:?}", delay);
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

/// Runs tasks right away, on the caller's stack, ignoring the delay
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl DelayScheduler for ImmediateScheduler {
    fn schedule(&self, _delay: Duration, task: DeferredTask) {
        task();
    }
}

/// Queues tasks until the test decides to run them
#[cfg(test)]
#[derive(Default)]
pub struct ManualScheduler {
    pending: parking_lot::Mutex<Vec<(Duration, DeferredTask)>>,
}

#[cfg(test)]
impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.pending.lock().iter().map(|(d, _)| *d).collect()
    }

    /// Run every queued task in scheduling order
    pub fn run_all(&self) {
        let tasks: Vec<_> = std::mem::take(&mut *self.pending.lock());
        for (_, task) in tasks {
            task();
        }
    }
}

#[cfg(test)]
impl DelayScheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: DeferredTask) {
        self.pending.lock().push((delay, task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_immediate_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        ImmediateScheduler.schedule(Duration::from_secs(10), Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_holds_tasks_until_run() {
        let scheduler = ManualScheduler::default();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let c = Arc::clone(&counter);
            scheduler.schedule(Duration::from_millis(5), Box::new(move || {
                c.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(scheduler.pending(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        scheduler.run_all();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tokio_scheduler_needs_runtime() {
        assert!(TokioScheduler::from_current().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_waits_for_delay() {
        let scheduler = TokioScheduler::from_current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let started = tokio::time::Instant::now();

        scheduler.schedule(Duration::from_millis(1500), Box::new(move || {
            let _ = tx.send(());
        }));

        rx.await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
