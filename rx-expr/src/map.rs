// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Map`: transform every `Next` value, passing `Error`/`Completion` through
//! unchanged.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event};
use std::sync::Arc;

struct MapNode<A, B, F> {
    child: Rx<A>,
    f: F,
    _marker: std::marker::PhantomData<fn(A) -> B>,
}

impl<A, B, F> RxNode<B> for MapNode<A, B, F>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    F: Fn(A) -> B + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<B>) -> Cancelable {
        let this = self.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(value) => match rx_core::guard_callback("Map", || (this.f)(value)) {
                Ok(mapped) => sink(Event::Next(mapped)),
                Err(e) => sink(Event::Error(e)),
            },
            Event::Error(e) => sink(Event::Error(e)),
            Event::Completion => sink(Event::Completion),
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Transform every value with `f`. Panics inside `f` are caught and
    /// surfaced as `Event::Error` rather than unwinding (§4.1.2).
    pub fn map<B: Send + Sync + 'static>(
        &self,
        f: impl Fn(A) -> B + Send + Sync + 'static,
    ) -> Rx<B> {
        Rx::from_node(Arc::new(MapNode {
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
    use rx_core::RxError;

    #[test]
    fn applies_f_to_every_value_in_order() {
        // S2: fromSeq([1,2,3]).map(x => x * x)
        let mapped = Rx::from_seq(vec![1, 2, 3]).map(|x| x * x);
        let sink = TestSink::new();
        let _cancel = mapped.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 4, 9]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn composition_matches_mapping_the_composed_function() {
        // Functor law: map(f).map(g) == map(g . f)
        let left = Rx::from_seq(vec![1, 2, 3])
            .map(|x| x + 1)
            .map(|x| x * 2);
        let right = Rx::from_seq(vec![1, 2, 3]).map(|x| (x + 1) * 2);
        let left_sink = TestSink::new();
        let right_sink = TestSink::new();
        let _a = left.subscribe(&one_shot_ctx(), left_sink.sink());
        let _b = right.subscribe(&one_shot_ctx(), right_sink.sink());
        assert_eq!(left_sink.values(), right_sink.values());
    }

    #[test]
    fn panic_in_f_becomes_an_error_event() {
        let mapped = Rx::single(1).map(|_: i32| -> i32 { panic!("boom") });
        let sink = TestSink::new();
        let _cancel = mapped.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), Vec::<i32>::new());
        assert_eq!(sink.errors(), 1);
    }

    #[test]
    fn upstream_error_passes_through_unchanged() {
        let mapped = Rx::<i32>::exception(RxError::custom("boom")).map(|x| x + 1);
        let sink = TestSink::new();
        let _cancel = mapped.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.errors(), 1);
        assert_eq!(sink.completions(), 0);
    }
}
