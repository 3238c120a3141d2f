// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Rx.future(f)`: wrap a host-async handle (a Rust [`Future`]) as a
//! single-shot cold `Rx<A>` — every subscription polls the future fresh via
//! a spawned task; the future's outcome becomes `Next(v)` followed by
//! `Completion`, or `Error(e)` if it resolves to `Err` (§6 "errors from
//! handle become `Error`").

use rx_core::{Cancelable, Event, RxError};
use rx_expr::{Rx, RxNode, RunCtx, SinkFn};
use std::future::Future;
use std::sync::Arc;

struct FutureNode<A, Fut, F> {
    make_future: F,
    _marker: std::marker::PhantomData<fn() -> (A, Fut)>,
}

impl<A, Fut, F> RxNode<A> for FutureNode<A, Fut, F>
where
    A: Send + Sync + 'static,
    Fut: Future<Output = Result<A, RxError>> + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let outer = Cancelable::noop();
        let fut = (self.make_future)();
        let sink_for_task = sink.clone();
        let cancelled = outer.cancelled();
        let join = tokio::runtime::Handle::current().spawn(async move {
            tokio::select! {
                biased;
                () = cancelled => {
                    sink_for_task(Event::Error(RxError::Interrupted));
                }
                outcome = fut => {
                    match outcome {
                        Ok(value) => {
                            sink_for_task(Event::Next(value));
                            sink_for_task(Event::Completion);
                        }
                        Err(e) => {
                            sink_for_task(Event::Error(e));
                        }
                    }
                }
            }
        });
        outer.on_cancel(move || join.abort());
        outer
    }
}

/// Build a single-shot `Rx<A>` from a Rust future factory. Each
/// subscription calls `make_future` again and drives a fresh instance —
/// the cold-source convention every other leaf in this crate follows.
#[must_use]
pub fn future<A, Fut, F>(make_future: F) -> Rx<A>
where
    A: Send + Sync + 'static,
    Fut: Future<Output = Result<A, RxError>> + Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
{
    Rx::from_node(Arc::new(FutureNode {
        make_future,
        _marker: std::marker::PhantomData,
    }))
}
