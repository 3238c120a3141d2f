// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The combined-stream engine: `zip2..zip10` and `join2..join10`.
//!
//! Rust has no variadic generics, so the "one engine, N arities" design
//! note becomes one macro that stamps out a concrete, fully-typed node per
//! arity instead of a single runtime-generic combinator — each generated
//! function is ordinary monomorphic code, not reflection. `zip` pairs the
//! Nth value from every input positionally; once any one input completes
//! with its queue empty, the remaining values still buffered in every
//! other queue are discarded and the tuple stream ends. `join`
//! (`combineLatest`) re-emits a tuple of the most recent value from each
//! input every time any one of them produces a new value, once all of them
//! have produced at least one, and only ends once every input has
//! completed.
//!
//! A second error doesn't vanish silently: the first to arrive becomes the
//! `primary` surfaced to the sink (latched — it is the only `Error` ever
//! emitted), and later ones are folded in as `suppressed` via
//! `RxError::aggregate` for anything downstream that inspects
//! `RxError::Aggregate`. In continuous mode the node keeps its child
//! subscriptions alive after latching rather than tearing them down.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxError, RxResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

macro_rules! define_zip_join {
    ($zip_fn:ident, $join_fn:ident, $n:expr, [$($T:ident),+], [$($idx:tt),+]) => {
        /// Pair the Nth value from every input positionally; terminates,
        /// discarding whatever remains buffered in the other queues, as
        /// soon as one input completes with its own queue empty.
        #[must_use]
        pub fn $zip_fn<$($T: Clone + Send + Sync + 'static),+>(
            $($idx: Rx<$T>),+
        ) -> Rx<($($T),+,)> {
            struct Node<$($T),+> {
                $($idx: Rx<$T>),+
            }

            // Each input's own queue paired with whether that input has
            // completed — avoids needing an integer position alongside the
            // field-name identifiers the macro is invoked with.
            struct State<$($T),+> {
                $($idx: (VecDeque<$T>, bool)),+,
                errors: Vec<RxError>,
                error_latched: bool,
                finished: bool,
            }

            impl<$($T: Clone + Send + Sync + 'static),+> State<$($T),+> {
                fn any_done_and_empty(&self) -> bool {
                    $(
                        if self.$idx.1 && self.$idx.0.is_empty() {
                            return true;
                        }
                    )+
                    false
                }
            }

            impl<$($T: Clone + Send + Sync + 'static),+> RxNode<($($T),+,)> for Node<$($T),+> {
                fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<($($T),+,)>) -> Cancelable {
                    let continuous = ctx.is_continuous();
                    let state = Arc::new(Mutex::new(State {
                        $($idx: (VecDeque::new(), false)),+,
                        errors: Vec::new(),
                        error_latched: false,
                        finished: false,
                    }));
                    let outer = Cancelable::noop();
                    let mut children = Vec::new();
                    $(
                        {
                            let state = state.clone();
                            let sink = sink.clone();
                            let outer = outer.clone();
                            let child_sink: SinkFn<$T> = Arc::new(move |event: Event<$T>| {
                                match event {
                                    Event::Next(v) => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.$idx.0.push_back(v);
                                        drive_zip(&mut guard, &sink)
                                    }
                                    Event::Error(e) => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.errors.push(e);
                                        if guard.error_latched {
                                            return RxResult::CONTINUE;
                                        }
                                        guard.error_latched = true;
                                        let aggregated = RxError::aggregate(guard.errors.clone());
                                        if !continuous {
                                            guard.finished = true;
                                        }
                                        drop(guard);
                                        let r = sink(Event::Error(aggregated));
                                        if !continuous {
                                            outer.cancel();
                                        }
                                        r
                                    }
                                    Event::Completion => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.$idx.1 = true;
                                        drive_zip(&mut guard, &sink)
                                    }
                                }
                            });
                            children.push(self.$idx.subscribe(ctx, child_sink));
                        }
                    )+
                    outer.on_cancel(move || {
                        for c in children {
                            c.cancel();
                        }
                    });
                    outer
                }
            }

            fn drive_zip<$($T: Clone + Send + Sync + 'static),+>(
                state: &mut State<$($T),+>,
                sink: &SinkFn<($($T),+,)>,
            ) -> RxResult {
                loop {
                    let ready = $(!state.$idx.0.is_empty())&&+;
                    if ready {
                        let tuple = ($(state.$idx.0.pop_front().expect("checked non-empty")),+,);
                        let result = sink(Event::Next(tuple));
                        if !result.should_continue() {
                            state.finished = true;
                            return result;
                        }
                        continue;
                    }
                    if state.any_done_and_empty() {
                        state.finished = true;
                        $(state.$idx.0.clear();)+
                        return sink(Event::Completion);
                    }
                    return RxResult::CONTINUE;
                }
            }

            Rx::from_node(Arc::new(Node { $($idx),+ }))
        }

        /// Re-emit a tuple of the latest value from every input each time
        /// any one of them changes, once all have produced at least one
        /// value. Completes only once every input has completed.
        #[must_use]
        pub fn $join_fn<$($T: Clone + Send + Sync + 'static),+>(
            $($idx: Rx<$T>),+
        ) -> Rx<($($T),+,)> {
            struct Node<$($T),+> {
                $($idx: Rx<$T>),+
            }

            struct State<$($T),+> {
                $($idx: Option<$T>),+,
                completed_count: usize,
                errors: Vec<RxError>,
                error_latched: bool,
                finished: bool,
            }

            impl<$($T: Clone + Send + Sync + 'static),+> RxNode<($($T),+,)> for Node<$($T),+> {
                fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<($($T),+,)>) -> Cancelable {
                    let continuous = ctx.is_continuous();
                    let state = Arc::new(Mutex::new(State {
                        $($idx: None),+,
                        completed_count: 0,
                        errors: Vec::new(),
                        error_latched: false,
                        finished: false,
                    }));
                    let outer = Cancelable::noop();
                    let mut children = Vec::new();
                    $(
                        {
                            let state = state.clone();
                            let sink = sink.clone();
                            let outer = outer.clone();
                            let child_sink: SinkFn<$T> = Arc::new(move |event: Event<$T>| {
                                match event {
                                    Event::Next(v) => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.$idx = Some(v);
                                        try_emit_join(&mut guard, &sink)
                                    }
                                    Event::Error(e) => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.errors.push(e);
                                        if guard.error_latched {
                                            return RxResult::CONTINUE;
                                        }
                                        guard.error_latched = true;
                                        let aggregated = RxError::aggregate(guard.errors.clone());
                                        if !continuous {
                                            guard.finished = true;
                                        }
                                        drop(guard);
                                        let r = sink(Event::Error(aggregated));
                                        if !continuous {
                                            outer.cancel();
                                        }
                                        r
                                    }
                                    Event::Completion => {
                                        let mut guard = state.lock();
                                        if guard.finished {
                                            return RxResult::STOP;
                                        }
                                        guard.completed_count += 1;
                                        if guard.completed_count == $n {
                                            guard.finished = true;
                                            drop(guard);
                                            let r = sink(Event::Completion);
                                            outer.cancel();
                                            return r;
                                        }
                                        RxResult::CONTINUE
                                    }
                                }
                            });
                            children.push(self.$idx.subscribe(ctx, child_sink));
                        }
                    )+
                    outer.on_cancel(move || {
                        for c in children {
                            c.cancel();
                        }
                    });
                    outer
                }
            }

            fn try_emit_join<$($T: Clone),+>(
                state: &mut State<$($T),+>,
                sink: &SinkFn<($($T),+,)>,
            ) -> RxResult {
                let all_ready = $(state.$idx.is_some())&&+;
                if !all_ready {
                    return RxResult::CONTINUE;
                }
                let tuple = ($(state.$idx.clone().expect("checked present")),+,);
                sink(Event::Next(tuple))
            }

            Rx::from_node(Arc::new(Node { $($idx),+ }))
        }
    };
}

define_zip_join!(zip2, join2, 2, [A, B], [a, b]);
define_zip_join!(zip3, join3, 3, [A, B, C], [a, b, c]);
define_zip_join!(zip4, join4, 4, [A, B, C, D], [a, b, c, d]);
define_zip_join!(zip5, join5, 5, [A, B, C, D, E], [a, b, c, d, e]);
define_zip_join!(zip6, join6, 6, [A, B, C, D, E, F], [a, b, c, d, e, f]);
define_zip_join!(zip7, join7, 7, [A, B, C, D, E, F, G], [a, b, c, d, e, f, g]);
define_zip_join!(zip8, join8, 8, [A, B, C, D, E, F, G, H], [a, b, c, d, e, f, g, h]);
define_zip_join!(
    zip9, join9, 9,
    [A, B, C, D, E, F, G, H, I],
    [a, b, c, d, e, f, g, h, i]
);
define_zip_join!(
    zip10, join10, 10,
    [A, B, C, D, E, F, G, H, I, J],
    [a, b, c, d, e, f, g, h, i, j]
);

struct HomogeneousState<A> {
    queues: Vec<VecDeque<A>>,
    latest: Vec<Option<A>>,
    completed: Vec<bool>,
    errors: Vec<RxError>,
    error_latched: bool,
    finished: bool,
}

struct HomogeneousNode<A> {
    children: Vec<Rx<A>>,
    mode: HomogeneousMode,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum HomogeneousMode {
    Zip,
    Join,
}

impl<A: Clone + Send + Sync + 'static> RxNode<Vec<A>> for HomogeneousNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<Vec<A>>) -> Cancelable {
        assert!(
            self.children.len() <= 10,
            "zip/join tuple arity greater than 10 is not supported"
        );
        let n = self.children.len();
        let continuous = ctx.is_continuous();
        let state = Arc::new(Mutex::new(HomogeneousState {
            queues: (0..n).map(|_| VecDeque::new()).collect(),
            latest: vec![None; n],
            completed: vec![false; n],
            errors: Vec::new(),
            error_latched: false,
            finished: false,
        }));
        let outer = Cancelable::noop();
        let mut cancels = Vec::with_capacity(n);
        for (index, child) in self.children.iter().enumerate() {
            let state = state.clone();
            let sink = sink.clone();
            let outer = outer.clone();
            let mode = self.mode;
            let child_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
                Event::Next(v) => {
                    let mut guard = state.lock();
                    if guard.finished {
                        return RxResult::STOP;
                    }
                    match mode {
                        HomogeneousMode::Zip => {
                            guard.queues[index].push_back(v);
                            drive_homogeneous_zip(&mut guard, &sink)
                        }
                        HomogeneousMode::Join => {
                            guard.latest[index] = Some(v);
                            let ready = guard.latest.iter().all(Option::is_some);
                            if ready {
                                let row: Vec<A> = guard
                                    .latest
                                    .iter()
                                    .map(|v| v.clone().expect("checked present"))
                                    .collect();
                                sink(Event::Next(row))
                            } else {
                                RxResult::CONTINUE
                            }
                        }
                    }
                }
                Event::Error(e) => {
                    let mut guard = state.lock();
                    if guard.finished {
                        return RxResult::STOP;
                    }
                    guard.errors.push(e);
                    if guard.error_latched {
                        return RxResult::CONTINUE;
                    }
                    guard.error_latched = true;
                    let aggregated = RxError::aggregate(guard.errors.clone());
                    if !continuous {
                        guard.finished = true;
                    }
                    drop(guard);
                    let r = sink(Event::Error(aggregated));
                    if !continuous {
                        outer.cancel();
                    }
                    r
                }
                Event::Completion => {
                    let mut guard = state.lock();
                    if guard.finished {
                        return RxResult::STOP;
                    }
                    guard.completed[index] = true;
                    match mode {
                        HomogeneousMode::Zip => drive_homogeneous_zip(&mut guard, &sink),
                        HomogeneousMode::Join => {
                            let all_done = guard.completed.iter().all(|d| *d);
                            if all_done {
                                guard.finished = true;
                                drop(guard);
                                let r = sink(Event::Completion);
                                outer.cancel();
                                r
                            } else {
                                RxResult::CONTINUE
                            }
                        }
                    }
                }
            });
            cancels.push(child.subscribe(ctx, child_sink));
        }
        outer.on_cancel(move || {
            for c in cancels {
                c.cancel();
            }
        });
        outer
    }
}

fn drive_homogeneous_zip<A: Clone + Send + Sync + 'static>(
    state: &mut HomogeneousState<A>,
    sink: &SinkFn<Vec<A>>,
) -> RxResult {
    loop {
        let ready = state.queues.iter().all(|q| !q.is_empty());
        if ready {
            let row: Vec<A> = state
                .queues
                .iter_mut()
                .map(|q| q.pop_front().expect("checked non-empty"))
                .collect();
            let result = sink(Event::Next(row));
            if !result.should_continue() {
                state.finished = true;
                return result;
            }
            continue;
        }
        let any_done_and_empty = state
            .completed
            .iter()
            .zip(state.queues.iter())
            .any(|(done, q)| *done && q.is_empty());
        if any_done_and_empty {
            state.finished = true;
            for q in &mut state.queues {
                q.clear();
            }
            return sink(Event::Completion);
        }
        return RxResult::CONTINUE;
    }
}

/// Positionally pair the Nth value from every input in `children`,
/// terminating (and discarding whatever remains queued elsewhere) as soon
/// as one completes with its own queue empty. The homogeneous
/// (same-element-type, runtime-determined arity) counterpart to
/// [`zip2`]..[`zip10`].
#[must_use]
pub fn zip<A: Clone + Send + Sync + 'static>(children: Vec<Rx<A>>) -> Rx<Vec<A>> {
    Rx::from_node(Arc::new(HomogeneousNode {
        children,
        mode: HomogeneousMode::Zip,
    }))
}

/// Re-emit the latest value from every input in `children` each time any
/// one changes, once all have produced at least one value; completes once
/// every input has completed. The homogeneous counterpart to
/// [`join2`]..[`join10`].
#[must_use]
pub fn join<A: Clone + Send + Sync + 'static>(children: Vec<Rx<A>>) -> Rx<Vec<A>> {
    Rx::from_node(Arc::new(HomogeneousNode {
        children,
        mode: HomogeneousMode::Join,
    }))
}
