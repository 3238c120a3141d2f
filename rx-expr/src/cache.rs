// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Cache`/`RxOptionCache`: a relay that remembers the most recent value.
//!
//! With no TTL, every subscriber gets the same treatment: the first one to
//! arrive subscribes upstream, and every subscriber after it (including
//! itself) replays the latest value and then keeps receiving the live
//! stream — the same "replay latest, then live" shape as `RxVar`.
//!
//! With a TTL, the contract changes for subscribers that arrive while the
//! cached value is still fresh: they get exactly one synchronous replay and
//! nothing more — they never join the live multicast. Only a subscriber
//! that arrives with no cached value, or a stale one, triggers (or joins)
//! the upstream subscription that keeps the cache warm for everyone after
//! it.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Subscriber<A> {
    sink: SinkFn<A>,
    // Set once this subscriber has actually been handed an event through the
    // live multicast loop in `ensure_subscribed`. A synchronous cold upstream
    // runs to completion inside the very call that first subscribes it, so
    // the triggering subscriber must be registered *before* that call —
    // otherwise it would never see anything but the final cached value. This
    // flag lets the registering call below tell whether that already
    // happened, so it doesn't also replay (and double-complete) afterward.
    received_live: Arc<AtomicBool>,
}

struct CacheState<A> {
    latest: Option<A>,
    last_updated_nanos: Option<i64>,
    subscribers: Vec<(u64, Subscriber<A>)>,
    next_id: u64,
    done: bool,
}

/// Shared by `Cache` (element type `A`) and `RxOptionCache` (element type
/// `Option<A>`, starting from `None` until the first value arrives) — both
/// are "multicast the latest value" relays over a common element type `T`.
struct CacheNode<T> {
    child: Rx<T>,
    ttl: Option<Duration>,
    state: Mutex<CacheState<T>>,
    upstream: Mutex<Option<Cancelable>>,
}

impl<T: Clone + Send + Sync + 'static> CacheNode<T> {
    fn ensure_subscribed(self: &Arc<Self>, ctx: &RunCtx) {
        let mut upstream = self.upstream.lock();
        if upstream.is_some() {
            return;
        }
        let this = self.clone();
        let scheduler = ctx.scheduler().clone();
        let upstream_sink: SinkFn<T> = Arc::new(move |event: Event<T>| {
            let mut state = this.state.lock();
            if state.done {
                return RxResult::STOP;
            }
            match &event {
                Event::Next(v) => {
                    state.latest = Some(v.clone());
                    state.last_updated_nanos = Some(scheduler.now_nanos());
                }
                Event::Error(_) | Event::Completion => state.done = true,
            }
            let subscribers: Vec<_> = state
                .subscribers
                .iter()
                .map(|(_, s)| (s.sink.clone(), s.received_live.clone()))
                .collect();
            drop(state);
            let mut combined = RxResult::CONTINUE;
            for (sink, received_live) in subscribers {
                received_live.store(true, Ordering::SeqCst);
                combined = combined.combine(sink(event.clone()));
            }
            combined
        });
        *upstream = Some(self.child.subscribe(ctx, upstream_sink));
    }

    fn is_fresh(&self, now_nanos: i64) -> bool {
        let state = self.state.lock();
        let Some(last_updated) = state.last_updated_nanos else {
            return false;
        };
        if state.latest.is_none() {
            return false;
        }
        match self.ttl {
            None => true,
            Some(ttl) => (now_nanos - last_updated) < ttl.as_nanos() as i64,
        }
    }
}

impl<T: Clone + Send + Sync + 'static> RxNode<T> for CacheNode<T> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<T>) -> Cancelable {
        let (already_done, terminal_replay) = {
            let state = self.state.lock();
            (state.done, state.latest.clone())
        };
        if already_done {
            if let Some(value) = terminal_replay {
                sink(Event::Next(value));
            }
            sink(Event::Completion);
            return Cancelable::noop();
        }

        if self.ttl.is_some() && self.is_fresh(ctx.scheduler().now_nanos()) {
            let value = self.state.lock().latest.clone();
            if let Some(value) = value {
                sink(Event::Next(value));
            }
            return Cancelable::noop();
        }

        // Register as a live subscriber *before* triggering the upstream
        // subscription: if this call is the one that actually subscribes a
        // synchronous cold source, every event it produces is delivered
        // inline, to everyone already on the list — including us, if we're
        // on it in time.
        let received_live = Arc::new(AtomicBool::new(false));
        let id;
        {
            let mut state = self.state.lock();
            id = state.next_id;
            state.next_id += 1;
            state.subscribers.push((
                id,
                Subscriber {
                    sink: sink.clone(),
                    received_live: received_live.clone(),
                },
            ));
        }
        self.ensure_subscribed(ctx);
        if !received_live.load(Ordering::SeqCst) {
            let (replay, already_done) = {
                let state = self.state.lock();
                (state.latest.clone(), state.done)
            };
            if let Some(value) = replay {
                sink(Event::Next(value));
            }
            if already_done {
                sink(Event::Completion);
            }
        }
        let this = self.clone();
        Cancelable::new(move || {
            this.state.lock().subscribers.retain(|(sid, _)| *sid != id);
        })
    }
}

impl<A: Clone + Send + Sync + 'static> Rx<A> {
    /// Multicast the latest value to every subscriber, replaying it
    /// immediately to late subscribers, with no expiry.
    #[must_use]
    pub fn cache(&self) -> Rx<A> {
        self.cache_with_ttl(None)
    }

    /// As [`Rx::cache`], but a replayed value older than `ttl` is treated as
    /// absent: the subscriber triggers (or joins) a fresh upstream
    /// subscription instead of receiving the stale value.
    #[must_use]
    pub fn cache_with_ttl(&self, ttl: Option<Duration>) -> Rx<A> {
        Rx::from_node(Arc::new(CacheNode {
            child: self.clone(),
            ttl,
            state: Mutex::new(CacheState {
                latest: None,
                last_updated_nanos: None,
                subscribers: Vec::new(),
                next_id: 0,
                done: false,
            }),
            upstream: Mutex::new(None),
        }))
    }
}

impl<A: Clone + Send + Sync + 'static> Rx<Option<A>> {
    /// As [`Rx::cache`], but the cached slot starts at `None` (no replay
    /// occurs before the first upstream value, matching `RxOptionVar`).
    #[must_use]
    pub fn cache_option(&self) -> Rx<Option<A>> {
        self.cache()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn late_subscriber_replays_the_latest_value() {
        let cached = Rx::from_seq(vec![1, 2, 3]).cache();
        let first = TestSink::new();
        let _first_cancel = cached.subscribe(&one_shot_ctx(), first.sink());
        assert_eq!(first.values(), vec![1, 2, 3]);

        // Subscribing again after the upstream is already done replays the
        // last value and the terminal Completion, without re-running the
        // upstream.
        let second = TestSink::new();
        let _second_cancel = cached.subscribe(&one_shot_ctx(), second.sink());
        assert_eq!(second.values(), vec![3]);
        assert_eq!(second.completions(), 1);
    }

    #[test]
    fn cache_with_no_upstream_value_yet_replays_nothing() {
        let cached = Rx::<i32>::from_seq(vec![]).cache();
        let sink = TestSink::new();
        let _cancel = cached.subscribe(&one_shot_ctx(), sink.sink());
        assert!(sink.values().is_empty());
        assert_eq!(sink.completions(), 1);
    }
}
