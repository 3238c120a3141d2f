// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test-only helpers shared by this crate's unit tests.
//!
//! `rx-expr` sits below the workspace's `rx-test-utils` crate in the
//! dependency graph (test-utils depends on the expression algebra, not the
//! other way around), so its own unit tests can't reach for `TestSink` —
//! this module is the local, `#[cfg(test)]`-only equivalent, scoped to
//! synchronous operators that never touch a `Scheduler`.

#![cfg(test)]

use crate::rx::{Mode, RunCtx, SinkFn};
use parking_lot::Mutex;
use rx_core::{Cancelable, Event, RxResult, Scheduler, Timer};
use std::sync::Arc;
use std::time::Duration;

/// A [`Scheduler`] that panics if ever actually called — correct for tests
/// of the purely synchronous operators (`Map`, `Filter`, `Take`, …) that
/// never arm a timer. Timed-operator tests use `rx_runtime::TokioScheduler`
/// instead (see `timed.rs`'s own test module).
pub(crate) struct NoopScheduler;

impl Scheduler for NoopScheduler {
    fn now_nanos(&self) -> i64 {
        0
    }

    fn schedule_once(&self, _delay: Duration, _f: Box<dyn FnOnce() + Send>) -> Cancelable {
        panic!("NoopScheduler cannot schedule; this test needs rx_runtime::TokioScheduler");
    }

    fn new_timer(&self) -> Box<dyn Timer> {
        panic!("NoopScheduler cannot create timers; this test needs rx_runtime::TokioScheduler");
    }
}

pub(crate) fn one_shot_ctx() -> RunCtx {
    RunCtx::new(Arc::new(NoopScheduler), Mode::OneShot)
}

pub(crate) fn continuous_ctx() -> RunCtx {
    RunCtx::new(Arc::new(NoopScheduler), Mode::Continuous)
}

/// Records every event delivered to it, in arrival order, with unbounded
/// demand.
pub(crate) struct TestSink<A> {
    events: Arc<Mutex<Vec<Event<A>>>>,
}

impl<A: Send + Sync + 'static> TestSink<A> {
    pub(crate) fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sink(&self) -> SinkFn<A> {
        let events = self.events.clone();
        Arc::new(move |event: Event<A>| {
            events.lock().push(event);
            RxResult::CONTINUE
        })
    }

    pub(crate) fn values(&self) -> Vec<A>
    where
        A: Clone,
    {
        self.events
            .lock()
            .iter()
            .filter_map(Event::as_next)
            .cloned()
            .collect()
    }

    pub(crate) fn completions(&self) -> usize {
        self.events.lock().iter().filter(|e| e.is_completion()).count()
    }

    pub(crate) fn errors(&self) -> usize {
        self.events.lock().iter().filter(|e| e.is_error()).count()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().len()
    }
}
