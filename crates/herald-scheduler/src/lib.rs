//! Recurring-tick scheduling (§4.5 liveness/readiness loops).
//!
//! The source drives liveness and readiness checks with `robfig/cron`'s
//! `@every` expressions, which by default allow a slow tick to overlap the
//! next one. Herald's controller instead runs each recurring job as its own
//! [`tokio::task`] that awaits the previous tick to completion before
//! sleeping for the next period — ticks for a single job never overlap,
//! which matters here because a liveness tick that triggers a restart and a
//! readiness tick that triggers a path withdrawal must not race each other
//! for the same prefix.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Run `job` every `period`, waiting `initial_delay` before the first tick.
/// Each invocation of `job` is awaited to completion before the next sleep
/// begins. Returns once `cancel` is triggered, including mid-sleep.
pub async fn run_periodic<F, Fut>(
    initial_delay: Duration,
    period: Duration,
    cancel: CancellationToken,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    if !initial_delay.is_zero() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(initial_delay) => {}
        }
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = job() => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(period) => {}
        }
    }
}

/// Run `job` exactly once after `initial_delay`, unless cancelled first.
/// Used for the one-shot startup probe gate (§4.5 step 2).
pub async fn run_once<F, Fut>(initial_delay: Duration, cancel: &CancellationToken, job: F) -> Option<Fut::Output>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    if !initial_delay.is_zero() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = tokio::time::sleep(initial_delay) => {}
        }
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = job() => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn run_periodic_stops_on_cancel() {
        let cancel = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let cancel_clone = cancel.clone();

        let handle = tokio::spawn(async move {
            run_periodic(Duration::ZERO, Duration::from_secs(1), cancel_clone, || {
                let count = count_clone.clone();
                async move {
                    count.fetch_add(1, Ordering::SeqCst);
                }
            })
            .await;
        });

        tokio::time::advance(Duration::from_millis(1)).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert!(count.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn run_once_executes_single_call() {
        let cancel = CancellationToken::new();
        let result = run_once(Duration::ZERO, &cancel, || async { 42 }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test]
    async fn run_once_skips_when_cancelled_first() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = run_once(Duration::from_secs(5), &cancel, || async { 42 }).await;
        assert_eq!(result, None);
    }
}
