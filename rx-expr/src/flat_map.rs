// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `FlatMap`: map each upstream value to a child expression and switch to
//! it, exclusively — at most one inner subscription is live per outer value
//! (§4.1.1: "cancel the previous inner subscription (there is at most one
//! live inner at a time per outer value)"; §8 property 5 "FlatMap
//! exclusivity"). Inner `Next`s are forwarded; inner `Completion` is
//! swallowed so the outer stream keeps going — only the outer's own
//! `Completion` ends the subscription, and it is forwarded directly rather
//! than waiting on whatever inner is still live (§4.1.1's "simpler
//! conforming policy": "forward outer `Completion` directly and rely on
//! cancelation to tear down inner").

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxResult};
use parking_lot::Mutex;
use std::sync::Arc;

struct State {
    // Bumped every time a new inner is subscribed; a child sink checks its
    // captured generation against this before forwarding, so a stale
    // callback racing a cancel()-in-flight can't deliver to a sink that has
    // already moved on to (or past) the next inner.
    generation: u64,
    current: Cancelable,
}

struct FlatMapNode<A, B, F> {
    child: Rx<A>,
    f: F,
    _marker: std::marker::PhantomData<fn(A) -> B>,
}

impl<A, B, F> RxNode<B> for FlatMapNode<A, B, F>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: Fn(A) -> Rx<B> + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<B>) -> Cancelable {
        // Fresh per subscription (§9: operator scratch state is never
        // shared across subscriptions to the same Rx node).
        let state = Arc::new(Mutex::new(State {
            generation: 0,
            current: Cancelable::noop(),
        }));
        let this = self.clone();
        let ctx_for_children = ctx.clone();
        let outer = Cancelable::noop();
        let state_for_upstream = state.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(value) => {
                let child_rx = match rx_core::guard_callback("FlatMap", || (this.f)(value)) {
                    Ok(rx) => rx,
                    Err(e) => return sink(Event::Error(e)),
                };
                let my_generation = {
                    let mut state = state_for_upstream.lock();
                    state.generation += 1;
                    let previous = std::mem::replace(&mut state.current, Cancelable::noop());
                    drop(state);
                    previous.cancel();
                    state_for_upstream.lock().generation
                };
                let state_for_child = state_for_upstream.clone();
                let sink_for_child = sink.clone();
                let child_sink: SinkFn<B> = Arc::new(move |event: Event<B>| {
                    if state_for_child.lock().generation != my_generation {
                        return RxResult::STOP;
                    }
                    match event {
                        Event::Next(v) => sink_for_child(Event::Next(v)),
                        Event::Error(e) => sink_for_child(Event::Error(e)),
                        Event::Completion => RxResult::CONTINUE,
                    }
                });
                let child_cancel = child_rx.subscribe(&ctx_for_children, child_sink);
                let mut state = state_for_upstream.lock();
                if state.generation == my_generation {
                    state.current = child_cancel;
                } else {
                    drop(state);
                    child_cancel.cancel();
                }
                RxResult::CONTINUE
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => sink(Event::Completion),
        });
        let inner_cancel = self.child.subscribe(ctx, upstream_sink);
        let state_for_cancel = state.clone();
        outer.on_cancel(move || {
            inner_cancel.cancel();
            state_for_cancel.lock().current.cancel();
        });
        outer
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Map each value to a child expression, switching to it: at most one
    /// inner subscription is live at a time, and a new outer value cancels
    /// whatever inner is still running.
    pub fn flat_map<B: Send + Sync + 'static>(
        &self,
        f: impl Fn(A) -> Rx<B> + Send + Sync + 'static,
    ) -> Rx<B> {
        Rx::from_node(Arc::new(FlatMapNode {
            child: self.clone(),
            f,
            _marker: std::marker::PhantomData,
        }))
    }
}
