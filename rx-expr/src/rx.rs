// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The `Rx<A>` expression tree itself.
//!
//! The spec's design notes (§9) describe the operator hierarchy as "a
//! closed set of variant nodes matched structurally by the runner" and
//! suggest a discriminated record plus a switch for languages without
//! native sum types. Rust *has* native sum types, but an `enum` can't hold
//! children of varying element type (a `Map<A, B>`'s input is an `Rx<A>`,
//! its output an `Rx<B>`) without type erasure somewhere. We erase at the
//! node boundary instead of the tree boundary: each operator is its own
//! small struct implementing [`RxNode<Output>`], and `Rx<A>` is a thin
//! handle around `Arc<dyn RxNode<A>>`. The algebra is still closed — every
//! node type lives in this crate — it's just matched by dynamic dispatch
//! rather than a `match` on an enum discriminant, the same way the teacher
//! represents "a `Map` combinator" as a struct implementing `Stream` rather
//! than as an enum variant.

use rx_core::{Cancelable, Event, RxResult, Scheduler};
use std::sync::Arc;

/// A sink consuming events and reporting demand (§1, Glossary).
pub type SinkFn<A> = Arc<dyn Fn(Event<A>) -> RxResult + Send + Sync>;

/// Runner policy: whether a terminal event on a hot source ends the
/// subscription or is merely observed in passing (§4.1, §9 "Continuous
/// mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Terminates on the first `Completion`/`Error` observed on any path.
    OneShot,
    /// Keeps reading past completion/error so hot sources
    /// (`RxVar`/`RxSource`/`Interval`) can keep delivering.
    Continuous,
}

impl Mode {
    /// `true` for [`Mode::Continuous`].
    #[must_use]
    pub const fn is_continuous(self) -> bool {
        matches!(self, Mode::Continuous)
    }
}

/// Everything an operator node needs to subscribe to its inputs: the
/// scheduler for timed operators, and the runner's terminal-event policy.
#[derive(Clone)]
pub struct RunCtx {
    scheduler: Arc<dyn Scheduler>,
    mode: Mode,
}

impl RunCtx {
    /// Build a context for a fresh `run`/`run_once`/`run_continuously` call.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>, mode: Mode) -> Self {
        Self { scheduler, mode }
    }

    /// The scheduler timed operators arm timers against.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// The runner's terminal-event policy for this subscription.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Shorthand for `self.mode().is_continuous()`.
    #[must_use]
    pub const fn is_continuous(&self) -> bool {
        self.mode.is_continuous()
    }
}

/// An operator node: given a context and a downstream sink, wire up
/// whatever state and child subscriptions this operator needs and return a
/// handle that tears all of it down.
///
/// Every node "owns" its parameter closures exclusively and shares its
/// child `Rx`s by reference (§3: inputs "may be referenced by multiple
/// operators and by live subscriptions"), since `Rx<T>`'s `Arc` makes
/// sharing a child tree across several parents free.
pub trait RxNode<A>: Send + Sync {
    /// Subscribe, returning a [`Cancelable`] that releases every resource
    /// (child subscriptions, timers, buffers) this call allocated.
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable;
}

/// An immutable Rx expression: a handle to one node of the tree.
///
/// Cloning an `Rx` is an `Arc` clone — cheap, and it shares the underlying
/// node (and, transitively, any hot state it owns) rather than duplicating
/// it. Cold leaves (`Single`/`Seq`/`Try`/`Exception`/`Empty`/`Const`)
/// re-run their logic on every subscribe; hot sources (`RxVar`,
/// `RxOptionVar`, `RxSource`, `Interval`, `Timer`) multicast their shared
/// state to every subscriber instead (§9 "Hot vs cold").
pub struct Rx<A> {
    node: Arc<dyn RxNode<A>>,
}

impl<A> Clone for Rx<A> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
        }
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Wrap a freshly built node as an `Rx`.
    #[must_use]
    pub fn from_node(node: Arc<dyn RxNode<A>>) -> Self {
        Self { node }
    }

    /// Subscribe to this expression under `ctx`, delivering events to
    /// `sink`. This is the primitive the runner (`rx::run`/`run_once`/
    /// `run_continuously`) and every combinator's own subscribe
    /// implementation build on.
    pub fn subscribe(&self, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        self.node.clone().subscribe(ctx, sink)
    }

    /// Convenience subscribe that only wants values: `on_next` runs for
    /// every `Next`, and the subscription tears itself down the moment a
    /// terminal event arrives, without forwarding it anywhere (the `rx.
    /// subscribe(f)` sugar — "ignores non-`Next` except cancel on
    /// terminal"). Prefer [`Rx::subscribe`] when `Error`/`Completion` need
    /// handling.
    pub fn subscribe_values(
        &self,
        ctx: &RunCtx,
        on_next: impl Fn(A) + Send + Sync + 'static,
    ) -> Cancelable {
        let outer = Cancelable::noop();
        let outer_for_sink = outer.clone();
        let sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(value) => {
                on_next(value);
                RxResult::CONTINUE
            }
            Event::Error(_) | Event::Completion => {
                outer_for_sink.cancel();
                RxResult::STOP
            }
        });
        let inner = self.subscribe(ctx, sink);
        outer.on_cancel(move || inner.cancel());
        outer
    }
}
