// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and infrastructure for the Rx workspace.
//!
//! Since delivery in this runtime is synchronous (a sink call returns
//! before the source proceeds), a test double doesn't need the async
//! channel plumbing the teacher's own `fluxion-test-utils` uses — a plain
//! `Mutex<Vec<Event<A>>>` records everything a subscription produces, and
//! assertions read it back after `subscribe` returns (or, for hot/timed
//! sources under a real scheduler, after a short `tokio::time::sleep`).

use parking_lot::Mutex;
use rx_core::{Event, RxResult};
use rx_expr::SinkFn;
use std::fmt::Debug;
use std::sync::Arc;

/// Records every event delivered to it, in arrival order, under a
/// configurable demand policy.
pub struct TestSink<A> {
    events: Arc<Mutex<Vec<Event<A>>>>,
    policy: DemandPolicy,
}

/// How a [`TestSink`] answers demand after each `Next`.
#[derive(Debug, Clone, Copy)]
pub enum DemandPolicy {
    /// Always request more, unbounded (the default).
    Unbounded,
    /// Stop after recording `n` `Next` events.
    TakeThenStop(usize),
}

impl<A: Send + Sync + 'static> Default for TestSink<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Send + Sync + 'static> TestSink<A> {
    /// A sink with unbounded demand.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            policy: DemandPolicy::Unbounded,
        }
    }

    /// A sink that stops after recording `n` `Next` events.
    #[must_use]
    pub fn take_then_stop(n: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            policy: DemandPolicy::TakeThenStop(n),
        }
    }

    /// Build the [`SinkFn`] closure to hand to `Rx::subscribe`.
    #[must_use]
    pub fn sink(&self) -> SinkFn<A> {
        let events = self.events.clone();
        let policy = self.policy;
        Arc::new(move |event: Event<A>| {
            let mut guard = events.lock();
            let is_next = event.is_next();
            guard.push(event);
            match policy {
                DemandPolicy::Unbounded => RxResult::CONTINUE,
                DemandPolicy::TakeThenStop(n) => {
                    let next_count = guard.iter().filter(|e| e.is_next()).count();
                    if is_next && next_count >= n {
                        RxResult::STOP
                    } else {
                        RxResult::CONTINUE
                    }
                }
            }
        })
    }

    /// Snapshot of every `Next` value recorded so far, in order.
    #[must_use]
    pub fn values(&self) -> Vec<A>
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

    /// `true` if a `Completion` was recorded.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.events.lock().iter().any(Event::is_completion)
    }

    /// `true` if an `Error` was recorded.
    #[must_use]
    pub fn errored(&self) -> bool {
        self.events.lock().iter().any(Event::is_error)
    }

    /// Total number of events recorded (`Next` + `Error` + `Completion`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// `true` if nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Assert that `sink` recorded exactly `expected`, as `Next` values, with
/// nothing else (no error, no completion) in between.
///
/// # Panics
/// Panics if the recorded values differ from `expected`.
pub fn assert_values<A: Clone + Debug + PartialEq + Send + Sync + 'static>(
    sink: &TestSink<A>,
    expected: &[A],
) {
    assert_eq!(sink.values(), expected);
}
