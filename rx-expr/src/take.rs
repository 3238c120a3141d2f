// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Take(n)`: forward the first `n` values, then complete and cancel the
//! upstream subscription. `n == 0` completes immediately without
//! subscribing upstream at all.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct TakeNode<A> {
    child: Rx<A>,
    count: u64,
}

impl<A: Send + Sync + 'static> RxNode<A> for TakeNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        if self.count == 0 {
            sink(Event::Completion);
            return Cancelable::noop();
        }
        let remaining = Arc::new(AtomicU64::new(self.count));
        let outer = Cancelable::noop();
        let outer_for_child = outer.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => {
                let result = sink(Event::Next(v));
                let left = remaining.fetch_sub(1, Ordering::SeqCst) - 1;
                if left == 0 {
                    sink(Event::Completion);
                    outer_for_child.cancel();
                    RxResult::STOP
                } else {
                    result
                }
            }
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => sink(Event::Completion),
        });
        let inner_cancel = self.child.subscribe(ctx, upstream_sink);
        outer.on_cancel(move || inner_cancel.cancel());
        outer
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Forward the first `count` values, then complete.
    #[must_use]
    pub fn take(&self, count: u64) -> Rx<A> {
        Rx::from_node(Arc::new(TakeNode {
            child: self.clone(),
            count,
        }))
    }
}
