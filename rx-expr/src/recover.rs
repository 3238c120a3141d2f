// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Recover`/`RecoverWith`: turn an upstream `Error` into something other
//! than a terminal failure, for the errors a partial handler is defined
//! for — `None` forwards the original `Error` unchanged (§4.1.1: "on
//! `Error(e)` where `pf isDefinedAt e`, emit `Next(pf(e))`; else forward").
//!
//! `Recover` substitutes a single replacement value and completes.
//! `RecoverWith` switches to an entirely different child expression and
//! relays its events instead — the common "retry with a fallback source"
//! shape.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::{Cancelable, Event, RxError};
use std::sync::Arc;

struct RecoverNode<A, F> {
    child: Rx<A>,
    handler: F,
}

impl<A, F> RxNode<A> for RecoverNode<A, F>
where
    A: Send + Sync + 'static,
    F: Fn(&RxError) -> Option<A> + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let this = self.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => sink(Event::Next(v)),
            Event::Completion => sink(Event::Completion),
            Event::Error(e) => match rx_core::guard_callback("Recover", || (this.handler)(&e)) {
                Ok(Some(replacement)) => {
                    if sink(Event::Next(replacement)).should_continue() {
                        sink(Event::Completion)
                    } else {
                        rx_core::RxResult::STOP
                    }
                }
                Ok(None) => sink(Event::Error(e)),
                Err(panic_err) => sink(Event::Error(panic_err)),
            },
        });
        self.child.subscribe(ctx, upstream_sink)
    }
}

struct RecoverWithNode<A, F> {
    child: Rx<A>,
    handler: F,
}

impl<A, F> RxNode<A> for RecoverWithNode<A, F>
where
    A: Send + Sync + 'static,
    F: Fn(&RxError) -> Option<Rx<A>> + Send + Sync + 'static,
{
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let this = self.clone();
        let ctx_clone = ctx.clone();
        let outer = Cancelable::noop();
        let outer_for_fallback = outer.clone();
        let upstream_sink: SinkFn<A> = Arc::new(move |event: Event<A>| match event {
            Event::Next(v) => sink(Event::Next(v)),
            Event::Completion => sink(Event::Completion),
            Event::Error(e) => {
                match rx_core::guard_callback("RecoverWith", || (this.handler)(&e)) {
                    Ok(Some(fallback)) => {
                        let fallback_cancel = fallback.subscribe(&ctx_clone, sink.clone());
                        outer_for_fallback.on_cancel(move || fallback_cancel.cancel());
                        rx_core::RxResult::CONTINUE
                    }
                    Ok(None) => sink(Event::Error(e)),
                    Err(panic_err) => sink(Event::Error(panic_err)),
                }
            }
        });
        let inner_cancel = self.child.subscribe(ctx, upstream_sink);
        outer.on_cancel(move || inner_cancel.cancel());
        outer
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Replace an upstream error the handler is defined for with a single
    /// value and complete; `None` forwards the original error unchanged.
    pub fn recover(
        &self,
        handler: impl Fn(&RxError) -> Option<A> + Send + Sync + 'static,
    ) -> Rx<A> {
        Rx::from_node(Arc::new(RecoverNode {
            child: self.clone(),
            handler,
        }))
    }

    /// Replace an upstream error the handler is defined for by switching to
    /// a fallback expression; `None` forwards the original error unchanged.
    pub fn recover_with(
        &self,
        handler: impl Fn(&RxError) -> Option<Rx<A>> + Send + Sync + 'static,
    ) -> Rx<A> {
        Rx::from_node(Arc::new(RecoverWithNode {
            child: self.clone(),
            handler,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn recover_substitutes_a_value_and_completes() {
        // S6: fromSeq([1,2]).concat(exception).recover(e => -1)
        let source = Rx::concat(vec![
            Rx::from_seq(vec![1, 2]),
            Rx::exception(RxError::custom("boom")),
        ]);
        let recovered = source.recover(|_| Some(-1));
        let sink = TestSink::new();
        let _cancel = recovered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2, -1]);
        assert_eq!(sink.completions(), 1);
        assert_eq!(sink.errors(), 0);
    }

    #[test]
    fn recover_does_not_fire_when_upstream_never_errors() {
        let recovered = Rx::from_seq(vec![1, 2]).recover(|_| Some(-1));
        let sink = TestSink::new();
        let _cancel = recovered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2]);
    }

    #[test]
    fn recover_forwards_the_original_error_when_the_handler_is_not_defined_for_it() {
        // §4.1.1: "on Error(e) where pf isDefinedAt e, emit Next(pf(e));
        // else forward" — an error the partial handler declines must reach
        // the sink unchanged rather than being swallowed.
        let source = Rx::exception(RxError::custom("boom"));
        let recovered = source.recover(|e| {
            if e.to_string().contains("timeout") {
                Some(-1)
            } else {
                None
            }
        });
        let sink = TestSink::new();
        let _cancel = recovered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), Vec::<i32>::new());
        assert_eq!(sink.errors(), 1);
    }

    #[test]
    fn recover_with_switches_to_the_fallback_source() {
        let source = Rx::exception(RxError::custom("boom"));
        let recovered = source.recover_with(|_| Some(Rx::from_seq(vec![10, 20])));
        let sink = TestSink::new();
        let _cancel = recovered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![10, 20]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn recover_with_forwards_the_original_error_when_the_handler_is_not_defined_for_it() {
        let source = Rx::exception(RxError::custom("boom"));
        let recovered = source.recover_with(|_| None);
        let sink = TestSink::new();
        let _cancel = recovered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), Vec::<i32>::new());
        assert_eq!(sink.errors(), 1);
    }
}
