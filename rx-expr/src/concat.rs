// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Concat`: subscribe to a sequence of child expressions one at a time,
//! moving to the next only once the previous one completes. An `Error`
//! from any child propagates immediately and the remaining children are
//! never subscribed.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxResult};
use parking_lot::Mutex;
use std::sync::Arc;

struct ConcatNode<A> {
    children: Vec<Rx<A>>,
}

impl<A: Send + Sync + 'static> RxNode<A> for ConcatNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let outer = Cancelable::noop();
        let current = Arc::new(Mutex::new(Cancelable::noop()));
        let current_for_cancel = current.clone();
        outer.on_cancel(move || current_for_cancel.lock().cancel());
        subscribe_index(self, 0, ctx.clone(), sink, outer.clone(), current);
        outer
    }
}

fn subscribe_index<A: Send + Sync + 'static>(
    this: Arc<ConcatNode<A>>,
    index: usize,
    ctx: RunCtx,
    sink: SinkFn<A>,
    outer: Cancelable,
    current: Arc<Mutex<Cancelable>>,
) {
    if outer.is_cancelled() {
        return;
    }
    let Some(next_rx) = this.children.get(index) else {
        sink(Event::Completion);
        return;
    };
    let this_for_child = this.clone();
    let ctx_for_child = ctx.clone();
    let outer_for_child = outer.clone();
    let current_for_child = current.clone();
    let sink_for_child = sink.clone();
    let child_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
        Event::Next(v) => sink_for_child(Event::Next(v)),
        Event::Error(e) => sink_for_child(Event::Error(e)),
        Event::Completion => {
            let result = RxResult::CONTINUE;
            subscribe_index(
                this_for_child.clone(),
                index + 1,
                ctx_for_child.clone(),
                sink_for_child.clone(),
                outer_for_child.clone(),
                current_for_child.clone(),
            );
            result
        }
    });
    let cancel = next_rx.subscribe(&ctx, child_sink);
    *current.lock() = cancel;
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Subscribe to `children` in order, moving to the next once the
    /// previous one completes.
    #[must_use]
    pub fn concat(children: Vec<Rx<A>>) -> Self {
        Rx::from_node(Arc::new(ConcatNode { children }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};
    use rx_core::RxError;

    #[test]
    fn subscribes_children_in_order() {
        let chained = Rx::concat(vec![
            Rx::from_seq(vec![1, 2]),
            Rx::from_seq(vec![3, 4]),
            Rx::single(5),
        ]);
        let sink = TestSink::new();
        let _cancel = chained.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2, 3, 4, 5]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn an_error_from_any_child_stops_the_remaining_ones() {
        let chained = Rx::concat(vec![
            Rx::from_seq(vec![1, 2]),
            Rx::<i32>::exception(RxError::custom("boom")),
            Rx::single(99),
        ]);
        let sink = TestSink::new();
        let _cancel = chained.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2]);
        assert_eq!(sink.errors(), 1);
        assert!(!sink.values().contains(&99));
    }

    #[test]
    fn empty_list_completes_immediately() {
        let chained: Rx<i32> = Rx::concat(vec![]);
        let sink = TestSink::new();
        let _cancel = chained.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.completions(), 1);
    }
}
