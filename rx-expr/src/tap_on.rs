// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `TapOn`: observe every event passing through without altering it. Panics
//! in the tap callback are caught and become an `Error` in place of the
//! observed event, same as every other user callback (§4.1.2).

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event};
use std::sync::Arc;

struct TapOnNode<A, F> {
    child: Rx<A>,
    f: F,
}

impl<A, F> RxNode<A> for TapOnNode<A, F>
where
    A: Send + Sync + 'static,
    F: Fn(&Event<A>) + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let this = self.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| {
            match rx_core::guard_callback("TapOn", || (this.f)(&event)) {
                Ok(()) => sink(event),
                Err(e) => sink(Event::Error(e)),
            }
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Observe every event without altering it.
    pub fn tap_on(&self, f: impl Fn(&Event<A>) + Send + Sync + 'static) -> Rx<A> {
        Rx::from_node(Arc::new(TapOnNode {
            child: self.clone(),
            f,
        }))
    }
}
