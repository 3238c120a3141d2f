// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The runner: drives an [`Rx`] expression to completion under a
//! [`Scheduler`] (§4.1, §6).
//!
//! Three distinct entry points, matching §6's `run`/`runOnce`/
//! `runContinuously` table exactly — these are not three names for the
//! same behavior:
//!
//! - [`run`]: subscribes in [`Mode::OneShot`] and auto-cancels the instant
//!   `sink` observes a terminal event (`Error` or `Completion`) — the
//!   shape every cold pipeline and most `flatMap`/`zip`/`join` trees want.
//! - [`run_once`]: the §4.1 convenience that "stops after the first
//!   `Next`" — it cancels as soon as a single value has been delivered,
//!   even if the source would have produced more (a terminal event
//!   arriving before any `Next` still cancels too, since there is nothing
//!   left to wait for).
//! - [`run_continuously`]: subscribes in [`Mode::Continuous`], keeping the
//!   subscription alive past any one path's terminal event, which hot
//!   sources (`RxVar`, `RxSource`, `Interval`) rely on to keep delivering
//!   after, say, a sibling branch of a `Join` completes.

use parking_lot::{Condvar, Mutex};
use rx_core::{Cancelable, Event, RxResult, Scheduler};
use rx_expr::{Mode, Rx, RunCtx, SinkFn};
use std::sync::Arc;

/// Subscribe to `rx` under `scheduler` in [`Mode::Continuous`], delivering
/// to `sink` until the caller cancels the returned handle.
pub fn run_continuously<A: Send + Sync + 'static>(
    rx: &Rx<A>,
    scheduler: Arc<dyn Scheduler>,
    sink: SinkFn<A>,
) -> Cancelable {
    let ctx = RunCtx::new(scheduler, Mode::Continuous);
    rx.subscribe(&ctx, sink)
}

/// Subscribe to `rx` under `scheduler` in [`Mode::OneShot`]: the
/// subscription is cancelled automatically the first time `sink` observes
/// `Error` or `Completion`.
pub fn run<A: Send + Sync + 'static>(
    rx: &Rx<A>,
    scheduler: Arc<dyn Scheduler>,
    sink: SinkFn<A>,
) -> Cancelable {
    let ctx = RunCtx::new(scheduler, Mode::OneShot);
    let outer = Cancelable::noop();
    let outer_for_sink = outer.clone();
    let wrapped: SinkFn<A> = Arc::new(move |event: Event<A>| {
        let terminal = event.is_terminal();
        let result = sink(event);
        if terminal {
            outer_for_sink.cancel();
        }
        result
    });
    let inner = rx.subscribe(&ctx, wrapped);
    outer.on_cancel(move || inner.cancel());
    outer
}

/// Thin convenience (§4.1): subscribe to `rx` and cancel the instant
/// `sink` observes the first `Next`, whether or not the source would have
/// gone on to produce more. A terminal event arriving before any `Next`
/// cancels too — there's nothing left worth waiting for.
pub fn run_once<A: Send + Sync + 'static>(
    rx: &Rx<A>,
    scheduler: Arc<dyn Scheduler>,
    sink: SinkFn<A>,
) -> Cancelable {
    let ctx = RunCtx::new(scheduler, Mode::OneShot);
    let outer = Cancelable::noop();
    let outer_for_sink = outer.clone();
    let stop_after_next: SinkFn<A> = Arc::new(move |event: Event<A>| {
        let stop_now = event.is_next() || event.is_terminal();
        let result = sink(event);
        if stop_now {
            outer_for_sink.cancel();
        }
        result
    });
    let inner = rx.subscribe(&ctx, stop_after_next);
    outer.on_cancel(move || inner.cancel());
    outer
}

/// Subscribe to `rx` in one-shot mode ([`run`]) and block the calling
/// thread until a terminal event arrives, returning everything observed
/// in order.
///
/// Intended for synchronous call sites (tests, `main`, CLI tools) driving a
/// real [`Scheduler`] — it parks on a condition variable rather than
/// busy-waiting, so it is safe to call from outside the scheduler's own
/// executor thread. This is a Rust-ergonomic addition beyond §6's three
/// entry points, grounded in the teacher's own blocking run-and-collect
/// helper.
#[must_use]
pub fn run_and_collect<A: Send + Sync + 'static>(
    rx: &Rx<A>,
    scheduler: Arc<dyn Scheduler>,
) -> Vec<Event<A>> {
    let collected = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new((Mutex::new(false), Condvar::new()));

    let collected_for_sink = collected.clone();
    let done_for_sink = done.clone();
    let sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
        let terminal = event.is_terminal();
        collected_for_sink.lock().push(event);
        if terminal {
            let (lock, cvar) = &*done_for_sink;
            *lock.lock() = true;
            cvar.notify_all();
        }
        RxResult::CONTINUE
    });

    let _cancel = run(rx, scheduler, sink);

    let (lock, cvar) = &*done;
    let mut guard = lock.lock();
    if !*guard {
        cvar.wait(&mut guard);
    }
    drop(guard);

    std::mem::take(&mut *collected.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_expr::Rx;
    use rx_runtime::TokioScheduler;
    use rx_test_utils::TestSink;

    #[test]
    fn run_and_collect_collects_every_event_in_order_and_returns_after_completion() {
        let pipeline = Rx::from_seq(vec![1, 2, 3]).map(|n| n * 2);
        let events = run_and_collect(&pipeline, TokioScheduler::shared());
        assert_eq!(
            events.iter().filter_map(Event::as_next).copied().collect::<Vec<_>>(),
            vec![2, 4, 6]
        );
        assert!(events.iter().any(Event::is_completion));
    }

    #[test]
    fn run_tears_down_the_subscription_on_the_first_terminal_event() {
        let pipeline = Rx::from_seq(vec![1, 2, 3]);
        let sink = TestSink::new();
        let inner_sink = sink.sink();
        let _cancel = run(&pipeline, TokioScheduler::shared(), inner_sink);
        assert_eq!(sink.values(), vec![1, 2, 3]);
        assert!(sink.completed());
    }

    #[test]
    fn run_once_stops_after_delivering_a_single_next_even_though_more_were_available() {
        // §4.1: "a thin convenience `runOnce(rx, sink)` stops after the
        // first Next" — distinct from one-shot *mode*, which only
        // auto-cancels on a terminal event (see `run`, above).
        let pipeline = Rx::from_seq(vec![1, 2, 3]);
        let sink = TestSink::new();
        let inner_sink = sink.sink();
        let _cancel = run_once(&pipeline, TokioScheduler::shared(), inner_sink);
        assert_eq!(sink.values(), vec![1]);
        assert!(!sink.completed());
    }

    #[test]
    fn run_once_still_cancels_on_a_terminal_event_if_no_next_ever_arrives() {
        let sink = TestSink::new();
        let inner_sink = sink.sink();
        let _cancel = run_once(&Rx::<i32>::empty(), TokioScheduler::shared(), inner_sink);
        assert!(sink.values().is_empty());
        assert!(sink.completed());
    }

    #[tokio::test]
    async fn run_continuously_keeps_delivering_past_a_sibling_branch_completing() {
        use rx_expr::join2;

        let var = crate::RxVar::new(1);
        let joined = join2(var.as_rx(), Rx::single(10));
        let sink = TestSink::new();
        let inner_sink = sink.sink();
        let _cancel = run_continuously(&joined, TokioScheduler::shared(), inner_sink);
        // `Rx::single(10)` completes immediately on its own, but the join
        // stays alive (continuous mode) so the hot `var` side keeps
        // delivering afterward.
        var.set(2);
        assert_eq!(sink.values(), vec![(1, 10), (2, 10)]);
    }
}
