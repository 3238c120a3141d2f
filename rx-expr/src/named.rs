// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `Named`: attach a debug name to a node for tracing, without touching
//! the events flowing through it.

use crate::rx::{Rx, RxNode, RunCtx, SinkFn};
use rx_core::Cancelable;
use std::sync::Arc;

struct NamedNode<A> {
    child: Rx<A>,
    #[allow(dead_code)]
    name: String,
}

impl<A: Send + Sync + 'static> RxNode<A> for NamedNode<A> {
    fn subscribe(self: Arc<Self>, ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        #[cfg(feature = "tracing")]
        tracing::debug!(name = %self.name, "subscribing");
        self.child.subscribe(ctx, sink)
    }
}

impl<A: Send + Sync + 'static> Rx<A> {
    /// Attach `name` to this node for tracing; purely informational.
    #[must_use]
    pub fn named(&self, name: impl Into<String>) -> Rx<A> {
        Rx::from_node(Arc::new(NamedNode {
            child: self.clone(),
            name: name.into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{one_shot_ctx, TestSink};

    #[test]
    fn named_is_a_pure_passthrough() {
        let named = Rx::from_seq(vec![1, 2, 3]).named("numbers");
        let sink = TestSink::new();
        let _cancel = named.subscribe(&one_shot_ctx(), sink.sink());
        assert_eq!(sink.values(), vec![1, 2, 3]);
        assert_eq!(sink.completions(), 1);
    }
}
