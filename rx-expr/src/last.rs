// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Last`/`LastOption`: reduce a stream to its final value.
//!
//! `Last` emits only the final `Next` seen before `Completion`, and errors
//! if no value ever arrived. `LastOption` never errors on emptiness — it
//! always emits exactly one `Next(Option<A>)`, `None` if the upstream
//! completed without ever producing a value.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxError, RxResult};
use parking_lot::Mutex;
use std::sync::Arc;

struct LastNode<A> {
    child: Rx<A>,
}

impl<A: Clone + Send + Sync + 'static> RxNode<A> for LastNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        // Fresh per subscription (§9: "this state is never shared across
        // subscriptions even when the same Rx node is subscribed twice").
        let latest: Arc<Mutex<Option<A>>> = Arc::new(Mutex::new(None));
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => {
                *latest.lock() = Some(v);
                RxResult::CONTINUE
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => match latest.lock().take() {
                Some(v) => {
                    if sink(Event::Next(v)).should_continue() {
                        sink(Event::Completion)
                    } else {
                        RxResult::STOP
                    }
                }
                None => sink(Event::Error(RxError::custom(
                    "Last: upstream completed without emitting a value",
                ))),
            },
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

struct LastOptionNode<A> {
    child: Rx<A>,
}

impl<A: Clone + Send + Sync + 'static> RxNode<Option<A>> for LastOptionNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<Option<A>>) -> Cancelable {
        let latest: Arc<Mutex<Option<A>>> = Arc::new(Mutex::new(None));
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => {
                *latest.lock() = Some(v);
                RxResult::CONTINUE
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => {
                let last = latest.lock().take();
                if sink(Event::Next(last)).should_continue() {
                    sink(Event::Completion)
                } else {
                    RxResult::STOP
                }
            }
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

impl<A: Clone + Send + Sync + 'static> Rx<A> {
    /// Emit only the final value, erroring if the upstream never produced
    /// one.
    #[must_use]
    pub fn last(&self) -> Rx<A> {
        Rx::from_node(Arc::new(LastNode { child: self.clone() }))
    }

    /// Emit the final value wrapped in `Some`, or `None` if the upstream
    /// completed without ever producing one.
    #[must_use]
    pub fn last_option(&self) -> Rx<Option<A>> {
        Rx::from_node(Arc::new(LastOptionNode { child: self.clone() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn last_emits_the_final_value() {
        let sink = TestSink::new();
        let _cancel = Rx::from_seq(vec![1, 2, 3])
            .last()
            .subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![3]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn last_errors_if_upstream_never_emitted() {
        let sink = TestSink::new();
        let _cancel = Rx::<i32>::empty()
            .last()
            .subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), Vec::<i32>::new());
        assert_eq!(sink.errors(), 1);
    }

    #[test]
    fn last_option_emits_some_when_a_value_arrived() {
        let sink = TestSink::new();
        let _cancel = Rx::from_seq(vec![1, 2])
            .last_option()
            .subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![Some(2)]);
    }

    #[test]
    fn last_option_emits_none_when_upstream_was_empty() {
        let sink = TestSink::new();
        let _cancel = Rx::<i32>::empty()
            .last_option()
            .subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![None]);
        assert_eq!(sink.errors(), 0);
    }

    #[test]
    fn a_second_subscription_to_the_same_node_starts_from_fresh_scratch_state() {
        // §9: per-operator scratch state is never shared across
        // subscriptions to the same Rx node.
        let last = Rx::from_seq(vec![1, 2, 3]).last();
        let first = TestSink::new();
        let _first_cancel = last.subscribe(&one_shot_ctx(), first.sink());
        let second = TestSink::new();
        let _second_cancel = last.subscribe(&one_shot_ctx(), second.sink());
        assert_eq!(first.values(), vec![3]);
        assert_eq!(second.values(), vec![3]);
    }
}
