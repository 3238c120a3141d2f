// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `RxVar`/`RxOptionVar`: mutable, hot sources with subscriber fan-out.
//!
//! Unlike the cold leaves in `rx-expr::sources`, a var owns state that
//! outlives any one subscription: mutating it through [`RxVar::set`] or
//! [`RxVar::update`] fans the new value out to every currently-subscribed
//! sink. New subscribers immediately receive the current value (§4.3
//! "replay-then-live"), and `set`/`update` are equality-gated — a write
//! that doesn't change the value does not notify (the `force_*` variants
//! bypass the gate).
//!
//! `subscribe` takes a snapshot of the subscriber list, then releases the
//! var's lock *before* invoking any sink, so a sink that calls back into
//! the var (e.g. cancelling its own subscription, or writing a new value)
//! from within its own callback cannot deadlock against the var's mutex.

use rx_core::{Cancelable, Event, RxError, RxResult};
use rx_expr::{Rx, RxNode, RunCtx, SinkFn};
use parking_lot::Mutex;
use std::sync::Arc;

struct Subscriber<A> {
    id: u64,
    sink: SinkFn<A>,
}

struct VarState<A> {
    current: A,
    subscribers: Vec<Subscriber<A>>,
    next_id: u64,
    done: bool,
    // Set by `set_exception`, left `None` by `stop`. A subscriber that
    // arrives after the var is already done needs to know which terminal
    // event to replay — `set_exception`'s contract is that later
    // subscribers see the error too, not a bare `Completion`.
    terminal_error: Option<RxError>,
}

/// A mutable, hot, equality-gated cell broadcasting its value to every
/// live subscriber.
pub struct RxVar<A> {
    state: Arc<Mutex<VarState<A>>>,
}

impl<A> Clone for RxVar<A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A: Clone + PartialEq + Send + Sync + 'static> RxVar<A> {
    /// Create a var holding `initial`.
    #[must_use]
    pub fn new(initial: A) -> Self {
        Self {
            state: Arc::new(Mutex::new(VarState {
                current: initial,
                subscribers: Vec::new(),
                next_id: 0,
                done: false,
                terminal_error: None,
            })),
        }
    }

    /// Snapshot the current value.
    #[must_use]
    pub fn get(&self) -> A {
        self.state.lock().current.clone()
    }

    /// Replace the value, notifying subscribers only if it differs from
    /// the current one (§4.3 equality gate).
    pub fn set(&self, value: A) {
        self.write(value, false);
    }

    /// Apply `f` to the current value and store the result, notifying
    /// subscribers only if it differs.
    pub fn update(&self, f: impl FnOnce(&A) -> A) {
        let next = {
            let state = self.state.lock();
            f(&state.current)
        };
        self.write(next, false);
    }

    /// As [`RxVar::set`], but always notifies, even if the value is
    /// unchanged.
    pub fn force_set(&self, value: A) {
        self.write(value, true);
    }

    /// As [`RxVar::update`], but always notifies, even if the result is
    /// unchanged.
    pub fn force_update(&self, f: impl FnOnce(&A) -> A) {
        let next = {
            let state = self.state.lock();
            f(&state.current)
        };
        self.write(next, true);
    }

    fn write(&self, value: A, force: bool) {
        let (subscribers, new_value) = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            let changed = force || state.current != value;
            state.current = value;
            if !changed {
                return;
            }
            let subscribers = state.subscribers.iter().map(|s| s.sink.clone()).collect::<Vec<_>>();
            (subscribers, state.current.clone())
        };
        for sink in subscribers {
            sink(Event::Next(new_value.clone()));
        }
    }

    /// Push an error to every current subscriber and permanently close the
    /// var (§3: "`setException(e)` emits `Error(e)` and closes") — unlike
    /// [`RxVar::stop`], future subscribers observe the error too, not a bare
    /// `Completion`.
    pub fn set_exception(&self, error: RxError) {
        let subscribers: Vec<_> = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.terminal_error = Some(error.clone());
            state.subscribers.drain(..).map(|s| s.sink).collect()
        };
        for sink in subscribers {
            sink(Event::Error(error.clone()));
        }
    }

    /// Permanently complete the var: every current subscriber receives
    /// `Completion`, and future subscriptions complete immediately without
    /// replay.
    pub fn stop(&self) {
        let subscribers: Vec<_> = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            state.done = true;
            state.subscribers.drain(..).map(|s| s.sink).collect()
        };
        for sink in subscribers {
            sink(Event::Completion);
        }
    }

    /// View this var as an `Rx<A>` expression: subscribing replays the
    /// current value immediately, then delivers live updates.
    #[must_use]
    pub fn as_rx(&self) -> Rx<A> {
        Rx::from_node(Arc::new(RxVarNode {
            var: self.clone(),
        }))
    }
}

struct RxVarNode<A> {
    var: RxVar<A>,
}

impl<A: Clone + PartialEq + Send + Sync + 'static> RxNode<A> for RxVarNode<A> {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let (id, initial, already_done, terminal_error) = {
            let mut state = self.var.state.lock();
            let id = state.next_id;
            state.next_id += 1;
            if !state.done {
                state
                    .subscribers
                    .push(Subscriber { id, sink: sink.clone() });
            }
            (id, state.current.clone(), state.done, state.terminal_error.clone())
        };
        if already_done {
            if let Some(error) = terminal_error {
                sink(Event::Error(error));
            } else {
                sink(Event::Next(initial));
                sink(Event::Completion);
            }
        } else {
            sink(Event::Next(initial));
        }
        let var = self.var.clone();
        Cancelable::new(move || {
            var.state.lock().subscribers.retain(|s| s.id != id);
        })
    }
}

/// `RxOptionVar<A>`: an `RxVar<Option<A>>` that starts at `None` — the
/// "no value yet" state used by `RxSource`-adjacent code where absence is
/// meaningfully distinct from "not subscribed".
pub struct RxOptionVar<A> {
    inner: RxVar<Option<A>>,
}

impl<A> Clone for RxOptionVar<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Clone + PartialEq + Send + Sync + 'static> RxOptionVar<A> {
    /// Create an option var starting at `None`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: RxVar::new(None),
        }
    }

    /// Create an option var starting at `Some(initial)`.
    #[must_use]
    pub fn with_initial(initial: A) -> Self {
        Self {
            inner: RxVar::new(Some(initial)),
        }
    }

    /// Snapshot the current value.
    #[must_use]
    pub fn get(&self) -> Option<A> {
        self.inner.get()
    }

    /// Set to `Some(value)`, equality-gated against the current value.
    pub fn set(&self, value: A) {
        self.inner.set(Some(value));
    }

    /// Reset to `None`, equality-gated against the current value.
    pub fn clear(&self) {
        self.inner.set(None);
    }

    /// Apply `f` to the current value and store the result, equality-gated.
    pub fn update(&self, f: impl FnOnce(&Option<A>) -> Option<A>) {
        self.inner.update(f);
    }

    /// Push an error to every current subscriber.
    pub fn set_exception(&self, error: RxError) {
        self.inner.set_exception(error);
    }

    /// Permanently complete the var.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// View this var as an `Rx<Option<A>>` expression.
    #[must_use]
    pub fn as_rx(&self) -> Rx<Option<A>> {
        self.inner.as_rx()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_expr::Mode;
    use rx_test_utils::TestSink;

    fn ctx() -> RunCtx {
        RunCtx::new(rx_runtime::TokioScheduler::shared(), Mode::Continuous)
    }

    #[test]
    fn new_subscriber_replays_the_current_value_then_gets_live_updates() {
        let var = RxVar::new(1);
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1]);
        var.set(2);
        var.set(3);
        assert_eq!(sink.values(), vec![1, 2, 3]);
    }

    #[test]
    fn set_is_equality_gated_and_does_not_notify_on_an_unchanged_value() {
        let var = RxVar::new("a".to_string());
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        var.set("a".to_string());
        assert_eq!(sink.values(), vec!["a".to_string()]);
        var.set("b".to_string());
        assert_eq!(sink.values(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn force_set_notifies_even_when_the_value_is_unchanged() {
        let var = RxVar::new(1);
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        var.force_set(1);
        assert_eq!(sink.values(), vec![1, 1]);
    }

    #[test]
    fn update_applies_the_closure_to_the_current_value() {
        let var = RxVar::new(10);
        var.update(|n| n + 5);
        assert_eq!(var.get(), 15);
    }

    #[test]
    fn cancelling_a_subscription_stops_further_delivery() {
        let var = RxVar::new(1);
        let sink = TestSink::new();
        let cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        cancel.cancel();
        var.set(2);
        assert_eq!(sink.values(), vec![1]);
    }

    #[test]
    fn stop_completes_current_subscribers_and_replays_completion_to_later_ones() {
        let var = RxVar::new(1);
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        var.stop();
        assert!(sink.completed());
        assert!(!sink.errored());

        let late = TestSink::new();
        let _late_cancel = var.as_rx().subscribe(&ctx(), late.sink());
        assert_eq!(late.values(), vec![1]);
        assert!(late.completed());
    }

    #[test]
    fn set_exception_closes_the_var_and_later_subscribers_observe_the_error_too() {
        let var = RxVar::new(1);
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        var.set_exception(RxError::custom("boom"));
        assert!(sink.errored());
        assert!(!sink.completed());

        // A subscriber arriving after the var has already errored out sees
        // the error too, not a bare replay-then-Completion.
        let late = TestSink::new();
        let _late_cancel = var.as_rx().subscribe(&ctx(), late.sink());
        assert!(late.errored());
        assert!(late.values().is_empty());
    }

    #[test]
    fn rx_option_var_starts_at_none_and_tracks_set_and_clear() {
        let var = RxOptionVar::<i32>::empty();
        let sink = TestSink::new();
        let _cancel = var.as_rx().subscribe(&ctx(), sink.sink());
        assert_eq!(sink.values(), vec![None]);
        var.set(7);
        var.clear();
        assert_eq!(sink.values(), vec![None, Some(7), None]);
    }
}
