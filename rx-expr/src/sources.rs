// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cold leaf sources: `Single`, `Const`, `Seq`, `Try`, `Exception`, `Empty`.
//!
//! Every leaf here runs synchronously on the calling thread the moment
//! `subscribe` is invoked — there is no child to recurse into, so nothing
//! stops the whole delivery from happening inline except the sink's own
//! demand signal and (for the unbounded `Const` source) cancellation.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Event, RxError, RxResult};
use std::sync::Arc;

/// Emits `value` once, then completes.
struct SingleSource<A> {
    value: A,
}

impl<A: Clone + Send + Sync + 'static> RxNode<A> for SingleSource<A> {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        let result = sink(Event::Next(self.value.clone()));
        if result.should_continue() {
            sink(Event::Completion);
        }
        rx_core::Cancelable::noop()
    }
}

/// Repeats `value` forever, one `Next` per unit of demand, until the sink
/// stops or the subscription is cancelled. Never completes on its own.
struct ConstSource<A> {
    value: A,
}

impl<A: Clone + Send + Sync + 'static> RxNode<A> for ConstSource<A> {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        let cancelable = rx_core::Cancelable::noop();
        loop {
            if cancelable.is_cancelled() {
                break;
            }
            let result = sink(Event::Next(self.value.clone()));
            if !result.should_continue() {
                break;
            }
        }
        cancelable
    }
}

/// Emits each item of `items` in order, then completes. Stops early if the
/// sink reports it no longer wants more.
struct SeqSource<A> {
    items: Vec<A>,
}

impl<A: Clone + Send + Sync + 'static> RxNode<A> for SeqSource<A> {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        let cancelable = rx_core::Cancelable::noop();
        let mut stopped = false;
        for item in self.items.iter().cloned() {
            if cancelable.is_cancelled() {
                stopped = true;
                break;
            }
            let result = sink(Event::Next(item));
            if !result.should_continue() {
                stopped = true;
                break;
            }
        }
        if !stopped {
            sink(Event::Completion);
        }
        cancelable
    }
}

/// Calls `f` once; success becomes `Next` then `Completion`, failure becomes
/// `Error`.
struct TrySource<A, F> {
    f: F,
    _marker: std::marker::PhantomData<A>,
}

impl<A, F> RxNode<A> for TrySource<A, F>
where
    A: Send + Sync + 'static,
    F: Fn() -> Result<A, RxError> + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        match rx_core::guard_callback("Try source", || (self.f)())
            .unwrap_or_else(|e| Err(e))
        {
            Ok(value) => {
                if sink(Event::Next(value)).should_continue() {
                    sink(Event::Completion);
                }
            }
            Err(e) => {
                sink(Event::Error(e));
            }
        }
        rx_core::Cancelable::noop()
    }
}

/// Immediately emits `Error(error)`.
struct ExceptionSource {
    error: RxError,
}

impl<A: Send + Sync + 'static> RxNode<A> for ExceptionSource {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        sink(Event::Error(self.error.clone()));
        rx_core::Cancelable::noop()
    }
}

/// Immediately emits `Completion` without ever producing a value.
struct EmptySource;

impl<A: Send + Sync + 'static> RxNode<A> for EmptySource {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> rx_core::Cancelable {
        sink(Event::Completion);
        rx_core::Cancelable::noop()
    }
}

impl<A: Clone + Send + Sync + 'static> Rx<A> {
    /// A cold source emitting `value` once, then completing.
    #[must_use]
    pub fn single(value: A) -> Self {
        Self::from_node(Arc::new(SingleSource { value }))
    }

    /// A cold source repeating `value` forever (bounded only by the sink's
    /// own demand and cancellation).
    #[must_use]
    pub fn const_(value: A) -> Self {
        Self::from_node(Arc::new(ConstSource { value }))
    }

    /// A cold source replaying `items` in order, then completing.
    #[must_use]
    pub fn from_seq(items: Vec<A>) -> Self {
        Self::from_node(Arc::new(SeqSource { items }))
    }

    /// A cold source running a fallible closure once and surfacing its
    /// result as `Next`+`Completion` or `Error`.
    pub fn try_from(f: impl Fn() -> Result<A, RxError> + Send + Sync + 'static) -> Self {
        Self::from_node(Arc::new(TrySource {
            f,
            _marker: std::marker::PhantomData,
        }))
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// A cold source that immediately fails with `error`.
    #[must_use]
    pub fn exception(error: RxError) -> Self {
        Self::from_node(Arc::new(ExceptionSource { error }))
    }

    /// A cold source that immediately completes without emitting a value.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_node(Arc::new(EmptySource))
    }
}
