use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Runs some async work periodically until dropped. Each run finishes before the next tick is
/// awaited, so one timer never overlaps with itself; separate timers are independent.
pub struct Repeating {
    handle: JoinHandle<()>,
}

impl Repeating {
    /// The first run happens at `start`. Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(live: &LiveTimers, start: Instant, period: Duration, mut work: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let guard = live.track();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            let mut interval = interval_at(start, period);
            // No catch-up bursts after a slow tick
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                work().await;
            }
        });
        Self { handle }
    }
}

impl Drop for Repeating {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Counts timer tasks that haven't been torn down yet. A task stops counting once the runtime
/// actually drops it, not when it's merely asked to stop.
#[derive(Clone, Default)]
pub struct LiveTimers {
    count: Arc<AtomicUsize>,
}

impl LiveTimers {
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn track(&self) -> LiveGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        LiveGuard {
            count: self.count.clone(),
        }
    }
}

struct LiveGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_dropped() {
        let live = LiveTimers::default();
        let runs = Arc::new(AtomicUsize::new(0));
        let period = Duration::from_secs(15);

        let counter = runs.clone();
        let timer = Repeating::spawn(&live, Instant::now() + period, period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(live.get(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(40)).await;
        // At 15, 30, and 45
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        drop(timer);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(live.get(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_start() {
        let live = LiveTimers::default();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let _timer = Repeating::spawn(&live, Instant::now(), Duration::from_secs(15), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
