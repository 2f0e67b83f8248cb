use engine_config::settings::{DebounceSettings, SettingsError};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, sleep_until},
};
use tracing::{debug, trace};

#[derive(Debug)]
enum Control {
    Trigger,
    Cancel,
}

/// Coalesces bursts of triggers into a single run of an action.
///
/// Each trigger restarts the quiet period (`wait`). Once a burst has been
/// pending for longer than `max_wait`, the next trigger runs the action
/// right away instead of deferring it again.
pub struct RateLimiter {
    tx: mpsc::UnboundedSender<Control>,
    pending: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RateLimiter {
    /// Spawns the scheduler task owning `action`.
    pub fn spawn<F>(settings: DebounceSettings, action: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(run(rx, settings, pending.clone(), action));
        RateLimiter {
            tx,
            pending,
            handle,
        }
    }

    /// Validates the timing and spawns the scheduler.
    pub fn with_timing<F>(
        wait: Duration,
        max_wait: Option<Duration>,
        action: F,
    ) -> Result<Self, SettingsError>
    where
        F: FnMut() + Send + 'static,
    {
        Ok(Self::spawn(DebounceSettings::new(wait, max_wait)?, action))
    }

    pub fn trigger(&self) {
        // The scheduler only stops when the limiter is dropped.
        let _ = self.tx.send(Control::Trigger);
    }

    /// Drops the pending burst, if any, without running the action.
    pub fn cancel(&self) {
        let _ = self.tx.send(Control::Cancel);
    }

    /// Whether a burst is waiting to run.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<F>(
    mut rx: mpsc::UnboundedReceiver<Control>,
    settings: DebounceSettings,
    pending: Arc<AtomicBool>,
    mut action: F,
) where
    F: FnMut(),
{
    loop {
        match rx.recv().await {
            Some(Control::Trigger) => {}
            Some(Control::Cancel) => continue,
            None => return,
        }

        let start = Instant::now();
        let mut deadline = start + settings.wait();
        pending.store(true, Ordering::Release);

        let fire = loop {
            tokio::select! {
                ctl = rx.recv() => match ctl {
                    Some(Control::Trigger) => {
                        if start.elapsed() > settings.max_wait() {
                            trace!("max wait exceeded, running on next tick");
                            tokio::task::yield_now().await;
                            break true;
                        }
                        deadline = Instant::now() + settings.wait();
                    }
                    Some(Control::Cancel) => break false,
                    None => return,
                },
                _ = sleep_until(deadline) => break true,
            }
        };

        pending.store(false, Ordering::Release);
        if fire {
            debug!(
                waited_ms = start.elapsed().as_millis() as u64,
                "running debounced action"
            );
            action();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counting(settings: DebounceSettings) -> (RateLimiter, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let limiter = RateLimiter::spawn(settings, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (limiter, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_a_burst() {
        let (limiter, runs) = counting(DebounceSettings::from_millis(100, Some(1000)).unwrap());

        for _ in 0..5 {
            limiter.trigger();
            sleep(Duration::from_millis(10)).await;
        }
        assert!(limiter.is_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(150)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!limiter.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn max_wait_forces_execution_during_steady_triggers() {
        let (limiter, runs) = counting(DebounceSettings::from_millis(100, Some(300)).unwrap());

        // Triggers every 50ms never leave a 100ms quiet period.
        for _ in 0..8 {
            limiter.trigger();
            sleep(Duration::from_millis(50)).await;
        }

        assert!(runs.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_burst() {
        let (limiter, runs) = counting(DebounceSettings::from_millis(100, None).unwrap());

        limiter.trigger();
        limiter.cancel();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!limiter.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_run_separately() {
        let (limiter, runs) = counting(DebounceSettings::from_millis(20, None).unwrap());

        limiter.trigger();
        sleep(Duration::from_millis(50)).await;
        limiter.trigger();
        sleep(Duration::from_millis(50)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalid_timing_fails_construction() {
        let res = RateLimiter::with_timing(
            Duration::from_millis(100),
            Some(Duration::from_millis(10)),
            || {},
        );
        assert!(matches!(res, Err(SettingsError::MaxWaitBelowWait { .. })));
    }
}
