// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Timed operators: `Interval`, `Timer`, `ThrottleFirst`, `ThrottleLast`,
//! `Timeout`. All reach wall-clock time exclusively through
//! [`RunCtx::scheduler`] (§4.5) so they run identically under a real
//! `TokioScheduler` or a deterministic test double.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxError, RxResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct IntervalSource {
    period: Duration,
}

impl RxNode<u64> for IntervalSource {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<u64>) -> Cancelable {
        let timer = ctx.scheduler().new_timer();
        let handle: Arc<Mutex<Option<Cancelable>>> = Arc::new(Mutex::new(None));
        let handle_for_tick = handle.clone();
        let cancel = timer.schedule(
            self.period,
            Box::new(move |index| {
                if !sink(Event::Next(index)).should_continue() {
                    if let Some(c) = handle_for_tick.lock().as_ref() {
                        c.cancel();
                    }
                }
            }),
        );
        *handle.lock() = Some(cancel.clone());
        cancel
    }
}

struct TimerSource {
    delay: Duration,
}

impl RxNode<u64> for TimerSource {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<u64>) -> Cancelable {
        ctx.scheduler().schedule_once(
            self.delay,
            Box::new(move || {
                if sink(Event::Next(0)).should_continue() {
                    sink(Event::Completion);
                }
            }),
        )
    }
}

/// An infinite timer tick stream, one `Next(tick_index)` per `period`.
#[must_use]
pub fn interval(period: Duration) -> Rx<u64> {
    Rx::from_node(Arc::new(IntervalSource { period }))
}

/// A single `Next(0)` after `delay`, then completion.
#[must_use]
pub fn timer(delay: Duration) -> Rx<u64> {
    Rx::from_node(Arc::new(TimerSource { delay }))
}

struct ThrottleFirstNode<A> {
    child: Rx<A>,
    window: Duration,
}

impl<A: Send + Sync + 'static> RxNode<A> for ThrottleFirstNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let last_emit_nanos: Arc<Mutex<Option<i64>>> = Arc::new(Mutex::new(None));
        let scheduler = ctx.scheduler().clone();
        let window = self.window;
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => {
                let now = scheduler.now_nanos();
                let mut last = last_emit_nanos.lock();
                let elapsed_ok = match *last {
                    None => true,
                    Some(prev) => (now - prev) as u128 >= window.as_nanos(),
                };
                if elapsed_ok {
                    *last = Some(now);
                    drop(last);
                    sink(Event::Next(v))
                } else {
                    RxResult::CONTINUE
                }
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => sink(Event::Completion),
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

struct ThrottleLastNode<A> {
    child: Rx<A>,
    window: Duration,
}

struct ThrottleLastState<A> {
    pending: Option<A>,
    timer_armed: bool,
}

impl<A: Clone + Send + Sync + 'static> RxNode<A> for ThrottleLastNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let state = Arc::new(Mutex::new(ThrottleLastState {
            pending: None,
            timer_armed: false,
        }));
        let scheduler = ctx.scheduler().clone();
        let window = self.window;
        let outer = Cancelable::noop();

        let state_for_flush = state.clone();
        let sink_for_flush = sink.clone();
        let flush: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let value = {
                let mut guard = state_for_flush.lock();
                guard.timer_armed = false;
                guard.pending.take()
            };
            if let Some(v) = value {
                sink_for_flush(Event::Next(v));
            }
        });

        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => {
                let mut guard = state.lock();
                guard.pending = Some(v);
                if !guard.timer_armed {
                    guard.timer_armed = true;
                    drop(guard);
                    let flush = flush.clone();
                    scheduler.schedule_once(window, Box::new(move || flush()));
                }
                RxResult::CONTINUE
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => sink(Event::Completion),
        });
        let inner_cancel = self.child.subscribe(ctx, upstream_sink);
        outer.on_cancel(move || inner_cancel.cancel());
        outer
    }
}

struct TimeoutNode<A> {
    child: Rx<A>,
    duration: Duration,
}

impl<A: Send + Sync + 'static> RxNode<A> for TimeoutNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let outer = Cancelable::noop();
        let scheduler = ctx.scheduler().clone();
        let duration = self.duration;
        let watchdog: Arc<Mutex<Option<Cancelable>>> = Arc::new(Mutex::new(None));
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));

        let rearm: Arc<dyn Fn() + Send + Sync> = {
            let watchdog = watchdog.clone();
            let scheduler = scheduler.clone();
            let sink = sink.clone();
            let fired = fired.clone();
            let outer_for_timeout = outer.clone();
            Arc::new(move || {
                if let Some(prev) = watchdog.lock().take() {
                    prev.cancel();
                }
                let sink = sink.clone();
                let fired = fired.clone();
                let outer_for_timeout = outer_for_timeout.clone();
                let cancel = scheduler.schedule_once(
                    duration,
                    Box::new(move || {
                        if !fired.swap(true, std::sync::atomic::Ordering::SeqCst) {
                            sink(Event::Error(RxError::timeout(duration)));
                            outer_for_timeout.cancel();
                        }
                    }),
                );
                *watchdog.lock() = Some(cancel);
            })
        };
        rearm();

        let rearm_for_upstream = rearm.clone();
        let fired_for_upstream = fired.clone();
        let watchdog_for_upstream = watchdog.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
            if fired_for_upstream.load(std::sync::atomic::Ordering::SeqCst) {
                return RxResult::STOP;
            }
            match &event {
                Event::Next(_) => (rearm_for_upstream)(),
                Event::Error(_) | Event::Completion => {
                    if let Some(prev) = watchdog_for_upstream.lock().take() {
                        prev.cancel();
                    }
                }
            }
            sink(event)
        });
        let inner_cancel = self.child.subscribe(ctx, upstream_sink);
        outer.on_cancel(move || inner_cancel.cancel());
        outer
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Error with [`RxError::Timeout`] if no event arrives within
    /// `duration` of the last one (or of subscription, for the first).
    #[must_use]
    pub fn timeout(&self, duration: Duration) -> Rx<A> {
        Rx::from_node(Arc::new(TimeoutNode {
            child: self.clone(),
            duration,
        }))
    }

    /// Emit the first value in each `window`, dropping the rest until the
    /// window elapses.
    #[must_use]
    pub fn throttle_first(&self, window: Duration) -> Rx<A> {
        Rx::from_node(Arc::new(ThrottleFirstNode {
            child: self.clone(),
            window,
        }))
    }
}

impl<A: Clone + Send + Sync + 'static> Rx<A> {
    /// Emit the most recent value once per `window`, dropping intermediate
    /// values within the window.
    #[must_use]
    pub fn throttle_last(&self, window: Duration) -> Rx<A> {
        Rx::from_node(Arc::new(ThrottleLastNode {
            child: self.clone(),
            window,
        }))
    }
}
