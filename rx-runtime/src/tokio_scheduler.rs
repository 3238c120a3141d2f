// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use rx_core::scheduler::clamp;
use rx_core::{Cancelable, Scheduler, Timer};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// [`Scheduler`] backed by the ambient Tokio runtime.
///
/// Every call to [`TokioScheduler::schedule_once`] and
/// [`TokioScheduler::new_timer`] spawns onto [`tokio::runtime::Handle::current`],
/// so it must run inside a Tokio context — the same requirement the teacher's
/// `TokioRuntime`/`TokioTimer` pair imposes.
#[derive(Clone, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    /// Construct a scheduler bound to the Tokio runtime of the calling task.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convenience constructor producing a ready-to-share `Arc<dyn Scheduler>`.
    #[must_use]
    pub fn shared() -> Arc<dyn Scheduler> {
        Arc::new(Self::new())
    }
}

impl Scheduler for TokioScheduler {
    fn now_nanos(&self) -> i64 {
        // `Instant` has no epoch, so anchor against process start once and
        // report elapsed nanoseconds; monotonic is all §4.5 requires.
        static START: std::sync::OnceLock<tokio::time::Instant> = std::sync::OnceLock::new();
        let start = *START.get_or_init(tokio::time::Instant::now);
        tokio::time::Instant::now()
            .saturating_duration_since(start)
            .as_nanos() as i64
    }

    fn schedule_once(&self, delay: Duration, f: Box<dyn FnOnce() + Send>) -> Cancelable {
        let delay = clamp(delay);
        let handle: JoinHandle<()> = tokio::runtime::Handle::current().spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        });
        Cancelable::new(move || handle.abort())
    }

    fn new_timer(&self) -> Box<dyn Timer> {
        Box::new(TokioTimer)
    }
}

struct TokioTimer;

impl Timer for TokioTimer {
    fn schedule(&self, period: Duration, tick: Box<dyn Fn(u64) + Send + Sync>) -> Cancelable {
        let period = clamp(period);
        let handle: JoinHandle<()> = tokio::runtime::Handle::current().spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; §4.1.1 wants the first Next
            // after one period, so discard it before counting.
            interval.tick().await;
            let mut index: u64 = 0;
            loop {
                interval.tick().await;
                tick(index);
                index += 1;
            }
        });
        Cancelable::new(move || handle.abort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn schedule_once_fires_after_delay() {
        let scheduler = TokioScheduler::new();
        let fired = Arc::new(AtomicU64::new(0));
        let f = fired.clone();
        let _cancel = scheduler.schedule_once(Duration::from_millis(5), Box::new(move || {
            f.store(1, Ordering::SeqCst);
        }));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_before_fire_suppresses_callback() {
        let scheduler = TokioScheduler::new();
        let fired = Arc::new(AtomicU64::new(0));
        let f = fired.clone();
        let cancel = scheduler.schedule_once(Duration::from_millis(50), Box::new(move || {
            f.store(1, Ordering::SeqCst);
        }));
        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn timer_ticks_increment_index() {
        let scheduler = TokioScheduler::new();
        let timer = scheduler.new_timer();
        let count = Arc::new(AtomicU64::new(0));
        let last_index = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let li = last_index.clone();
        let cancel = timer.schedule(
            Duration::from_millis(5),
            Box::new(move |idx| {
                c.fetch_add(1, Ordering::SeqCst);
                li.store(idx, Ordering::SeqCst);
            }),
        );
        tokio::time::sleep(Duration::from_millis(35)).await;
        cancel.cancel();
        assert!(count.load(Ordering::SeqCst) >= 3);
    }
}
