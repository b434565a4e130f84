//! Cancellable scheduled tasks
//!
//! Two schedules are used by the controller:
//! - fixed delay: run, wait `interval`, run again (trading poll)
//! - fixed rate: run every `period`, first run immediately (balance refresh)
//!
//! Cancelling a task pre-empts whatever it is doing: a pending wait or an
//! in-flight tick future is dropped on the spot. Ticks receive the task's
//! token so they can re-check it right before touching shared state.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

/// Handle on a spawned repeating task. Dropping it cancels the task.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    token: CancellationToken,
    handle: JoinHandle<u64>,
    _guard: DropGuard,
}

impl ScheduledTask {
    /// Run `tick`, then sleep `interval`, until cancelled
    pub fn with_fixed_delay<F, Fut>(name: &'static str, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            debug!(task = name, "scheduled task started (fixed delay)");
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    () = tick(task_token.clone()) => ticks += 1,
                }
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    () = tokio::time::sleep(interval) => {}
                }
            }
            debug!(task = name, ticks, "scheduled task stopped");
            ticks
        });

        Self::from_parts(name, token, handle)
    }

    /// Run `tick` every `period`, the first time immediately, until cancelled
    pub fn at_fixed_rate<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            debug!(task = name, "scheduled task started (fixed rate)");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;
            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    () = tick(task_token.clone()) => ticks += 1,
                }
            }
            debug!(task = name, ticks, "scheduled task stopped");
            ticks
        });

        Self::from_parts(name, token, handle)
    }

    fn from_parts(name: &'static str, token: CancellationToken, handle: JoinHandle<u64>) -> Self {
        let guard = token.clone().drop_guard();
        Self {
            name,
            token,
            handle,
            _guard: guard,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Signal cancellation without waiting for the task to exit
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Cancel and wait for the task to exit, returning how many ticks completed
    pub async fn stop(self) -> u64 {
        let Self {
            name,
            token,
            handle,
            _guard,
        } = self;
        token.cancel();
        match handle.await {
            Ok(ticks) => ticks,
            Err(e) => {
                warn!(task = name, "scheduled task ended abnormally: {e}");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_waits_between_ticks() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let task = ScheduledTask::with_fixed_delay("test", Duration::from_secs(2), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(count.load(Ordering::SeqCst), 4);

        assert_eq!(task.stop().await, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_rate_runs_immediately_then_periodically() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let task = ScheduledTask::at_fixed_rate("test", Duration::from_secs(10), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        task.stop().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_preempts_in_flight_tick() {
        let finished = Arc::new(AtomicU64::new(0));
        let flag = finished.clone();
        let task = ScheduledTask::with_fixed_delay("slow", Duration::from_secs(2), move |_| {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                flag.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(task.stop().await, 0);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let task = ScheduledTask::with_fixed_delay("dropped", Duration::from_secs(1), move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        let token = task.token().clone();

        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(task);
        assert!(token.is_cancelled());

        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen);
    }
}
