// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Helpers bridging `Rx<A>` and `Rx<Option<A>>`, used throughout the
//! `RxOptionVar` family (§4.3) where "no value yet" is a first-class state
//! rather than the absence of a subscription.

use crate::rx::Rx;
use rx_core::Event;

impl<A: Send + Sync + 'static> Rx<A> {
    /// Wrap every value in `Some`.
    #[must_use]
    pub fn as_option(&self) -> Rx<Option<A>> {
        self.map(Some)
    }
}

impl<A: Send + Sync + 'static> Rx<Option<A>> {
    /// Drop `None` values, unwrapping `Some` (the option-aware analogue of
    /// `Filter` + `Map` composed).
    #[must_use]
    pub fn filter_some(&self) -> Rx<A> {
        self.transform(|event| match event {
            Event::Next(Some(v)) => vec![Event::Next(v)],
            Event::Next(None) => vec![],
            Event::Error(e) => vec![Event::Error(e)],
            Event::Completion => vec![Event::Completion],
        })
    }

    /// A single cold source emitting `value` and completing.
    #[must_use]
    pub fn from_option(value: Option<A>) -> Self
    where
        A: Clone,
    {
        Rx::single(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn as_option_wraps_every_value_in_some() {
        let wrapped = Rx::from_seq(vec![1, 2, 3]).as_option();
        let sink = TestSink::new();
        let _cancel = wrapped.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn filter_some_drops_none_and_unwraps_some() {
        let filtered = Rx::from_seq(vec![Some(1), None, Some(2), None]).filter_some();
        let sink = TestSink::new();
        let _cancel = filtered.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2]);
        assert_eq!(sink.completions(), 1);
    }

    #[test]
    fn from_option_emits_the_value_as_is_and_completes() {
        let some = Rx::from_option(Some(5));
        let sink = TestSink::new();
        let _cancel = some.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![Some(5)]);
        assert_eq!(sink.completions(), 1);

        let none: Rx<Option<i32>> = Rx::from_option(None);
        let sink = TestSink::new();
        let _cancel = none.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![None]);
        assert_eq!(sink.completions(), 1);
    }
}
