// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The `Transform` family: the general escape hatch for operators that
//! don't fit the fixed shape of `Map`/`Filter`/`FlatMap` — a callback gets
//! to see every event (including `Error`/`Completion`) and emit zero or
//! more events of its own in response.
//!
//! Three variants, one state-holding core:
//! - [`Rx::transform`]: the callback cannot fail.
//! - [`Rx::transform_try`]: the callback can fail; a failure becomes a
//!   single `Error` event (the rest of its would-be output is dropped).
//! - [`Rx::transform_rx`]: the callback returns a *child expression* per
//!   upstream event rather than a batch of events directly, and that
//!   child's own events are relayed downstream (subscriptions are
//!   sequenced: the next child is not subscribed until the previous one's
//!   subscription has fully settled, matching `concatMap` semantics).

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxError, RxResult};
use parking_lot::Mutex;
use std::sync::Arc;

struct TransformNode<A, B, F> {
    child: Rx<A>,
    // The prototype callback; each subscription clones its own fresh
    // instance (§9) so stateful `FnMut`s don't leak scratch state across
    // subscriptions to the same node.
    f: F,
    _marker: std::marker::PhantomData<fn(A) -> B>,
}

impl<A, B, F> RxNode<B> for TransformNode<A, B, F>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: FnMut(Event<A>) -> Vec<Event<B>> + Clone + Send + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<B>) -> Cancelable {
        let f = Mutex::new(self.f.clone());
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
            let outputs = match rx_core::guard_callback("Transform", || {
                let mut f = f.lock();
                (f)(event)
            }) {
                Ok(outputs) => outputs,
                Err(e) => vec![Event::Error(e)],
            };
            let mut result = RxResult::CONTINUE;
            for out in outputs {
                result = sink(out);
                if !result.should_continue() {
                    break;
                }
            }
            result
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

struct TransformTryNode<A, B, F> {
    child: Rx<A>,
    f: F,
    _marker: std::marker::PhantomData<fn(A) -> B>,
}

impl<A, B, F> RxNode<B> for TransformTryNode<A, B, F>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: FnMut(Event<A>) -> Result<Vec<Event<B>>, RxError> + Clone + Send + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<B>) -> Cancelable {
        let f = Mutex::new(self.f.clone());
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
            let outcome = rx_core::guard_callback("TransformTry", || {
                let mut f = f.lock();
                (f)(event)
            });
            let outputs = match outcome {
                Ok(Ok(outputs)) => outputs,
                Ok(Err(e)) | Err(e) => vec![Event::Error(e)],
            };
            let mut result = RxResult::CONTINUE;
            for out in outputs {
                result = sink(out);
                if !result.should_continue() {
                    break;
                }
            }
            result
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

struct TransformRxNode<A, B, F> {
    child: Rx<A>,
    f: F,
    _marker: std::marker::PhantomData<fn(A) -> B>,
}

impl<A, B, F> RxNode<B> for TransformRxNode<A, B, F>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: FnMut(Event<A>) -> Rx<B> + Clone + Send + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<B>) -> Cancelable {
        let f = Mutex::new(self.f.clone());
        let active: Mutex<Option<Cancelable>> = Mutex::new(None);
        let ctx_for_children = ctx.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
            let child_rx = match rx_core::guard_callback("TransformRx", || {
                let mut f = f.lock();
                (f)(event)
            }) {
                Ok(rx) => rx,
                Err(e) => return sink(Event::Error(e)),
            };
            if let Some(prev) = active.lock().take() {
                prev.cancel();
            }
            let cancel = child_rx.subscribe(&ctx_for_children, sink.clone());
            *active.lock() = Some(cancel);
            RxResult::CONTINUE
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// The general event-rewriting escape hatch: see module docs.
    pub fn transform<B: Send + Sync + 'static>(
        &self,
        f: impl FnMut(Event<A>) -> Vec<Event<B>> + Clone + Send + 'static,
    ) -> Rx<B> {
        Rx::from_node(Arc::new(TransformNode {
            child: self.clone(),
            f,
            _marker: std::marker::PhantomData,
        }))
    }

    /// As [`Rx::transform`], but the callback may fail.
    pub fn transform_try<B: Send + Sync + 'static>(
        &self,
        f: impl FnMut(Event<A>) -> Result<Vec<Event<B>>, RxError> + Clone + Send + 'static,
    ) -> Rx<B> {
        Rx::from_node(Arc::new(TransformTryNode {
            child: self.clone(),
            f,
            _marker: std::marker::PhantomData,
        }))
    }

    /// As [`Rx::transform`], but the callback returns a child expression per
    /// upstream event instead of a batch of events; at most one child
    /// subscription is active at a time.
    pub fn transform_rx<B: Send + Sync + 'static>(
        &self,
        f: impl FnMut(Event<A>) -> Rx<B> + Clone + Send + 'static,
    ) -> Rx<B> {
        Rx::from_node(Arc::new(TransformRxNode {
            child: self.clone(),
            f,
            _marker: std::marker::PhantomData,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn transform_can_emit_more_than_one_event_per_input() {
        let doubled = Rx::from_seq(vec![1, 2]).transform(|event| match event {
            Event::Next(v) => vec![Event::Next(v), Event::Next(v)],
            other => vec![other],
        });
        let sink = TestSink::new();
        let _cancel = doubled.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 1, 2, 2]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn transform_try_failure_becomes_a_single_error() {
        let rewritten = Rx::single(1).transform_try(|_event| -> Result<Vec<Event<i32>>, RxError> {
            Err(RxError::custom("boom"))
        });
        let sink = TestSink::new();
        let _cancel = rewritten.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), Vec::<i32>::new());
        assert_eq!(sink.errors(), 1);
    }

    #[test]
    fn a_stateful_transform_restarts_its_counter_on_each_subscription() {
        // §9: the callback's scratch state must not leak from one
        // subscription into the next, even sequential cold subscriptions
        // to the same node.
        let mut count = 0;
        let counted = Rx::from_seq(vec![1, 2, 3]).transform(move |event| match event {
            Event::Next(_) => {
                count += 1;
                vec![Event::Next(count)]
            }
            other => vec![other],
        });
        let first = TestSink::new();
        let _first_cancel = counted.subscribe(&one_shot_ctx(), first.sink());
        assert_eq!(first.values(), vec![1, 2, 3]);
        let second = TestSink::new();
        let _second_cancel = counted.subscribe(&one_shot_ctx(), second.sink());
        assert_eq!(second.values(), vec![1, 2, 3]);
    }

    #[test]
    fn transform_rx_sequences_child_subscriptions() {
        let expanded = Rx::from_seq(vec![1, 2]).transform_rx(|event| match event {
            Event::Next(v) => Rx::single(v * 10),
            Event::Error(e) => Rx::exception(e),
            Event::Completion => Rx::empty(),
        });
        let sink = TestSink::new();
        let _cancel = expanded.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![10, 20]);
        assert_eq!(sink.completions(), 1);
    }
}
