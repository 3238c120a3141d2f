// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `RxSource`: a bounded, FIFO, pull-based bridge from external producers
//! into the expression tree — the Rx-world counterpart of the teacher's
//! `UnboundedReceiverExt`/`into_fluxion_stream` channel adapters, except
//! bounded (so a slow consumer applies real backpressure to the producer)
//! and cancellation-aware (§4.4: "a puller awaiting the next item when its
//! subscription is cancelled observes `Interrupted`, not silence").

use rx_core::{Cancelable, Event, RxError, RxResult};
use rx_expr::{Rx, RxNode, RunCtx, SinkFn};
use std::sync::Arc;
use tokio::sync::mpsc;

enum Message<A> {
    Value(A),
    Error(RxError),
}

/// The producer half of an `RxSource` channel. Send calls block (via async
/// `send`) once the bounded buffer is full, the same backpressure a bounded
/// `tokio::sync::mpsc` channel already provides.
pub struct RxSourceSender<A> {
    tx: mpsc::Sender<Message<A>>,
}

impl<A: Send + 'static> RxSourceSender<A> {
    /// Push a value, waiting if the buffer is full.
    ///
    /// # Errors
    /// Returns `Err` if every consumer has been dropped.
    pub async fn send(&self, value: A) -> Result<(), A> {
        self.tx.send(Message::Value(value)).await.map_err(|e| match e.0 {
            Message::Value(v) => v,
            Message::Error(_) => unreachable!("only this sender ever sends Error"),
        })
    }

    /// Terminate the source with an error, waiting if the buffer is full.
    pub async fn send_error(&self, error: RxError) {
        let _ = self.tx.send(Message::Error(error)).await;
    }
}

struct RxSourceNode<A> {
    rx: tokio::sync::Mutex<Option<mpsc::Receiver<Message<A>>>>,
}

impl<A: Send + Sync + 'static> RxNode<A> for RxSourceNode<A> {
    fn subscribe(self: Arc<Self>, _ctx: &RunCtx, sink: SinkFn<A>) -> Cancelable {
        let outer = Cancelable::noop();
        let receiver = self.rx.try_lock().ok().and_then(|mut guard| guard.take());
        let Some(mut receiver) = receiver else {
            sink(Event::Error(RxError::custom(
                "RxSource only supports a single active subscription",
            )));
            return outer;
        };
        let cancelled = outer.cancelled();
        let sink_for_task = sink.clone();
        let join = tokio::runtime::Handle::current().spawn(async move {
            tokio::pin!(cancelled);
            loop {
                tokio::select! {
                    biased;
                    () = &mut cancelled => {
                        sink_for_task(Event::Error(RxError::Interrupted));
                        break;
                    }
                    message = receiver.recv() => {
                        match message {
                            Some(Message::Value(v)) => {
                                if !sink_for_task(Event::Next(v)).should_continue() {
                                    break;
                                }
                            }
                            Some(Message::Error(e)) => {
                                sink_for_task(Event::Error(e));
                                break;
                            }
                            None => {
                                sink_for_task(Event::Completion);
                                break;
                            }
                        }
                    }
                }
            }
        });
        outer.on_cancel(move || join.abort());
        outer
    }
}

/// Create a bounded FIFO channel bridging external producers into an
/// `Rx<A>` expression. `capacity` bounds how many values may be buffered
/// before [`RxSourceSender::send`] starts waiting.
///
/// Only one subscription may be active against the returned expression at
/// a time — a second `subscribe` call while the first is live immediately
/// errors (the channel's receiver can't be shared).
#[must_use]
pub fn bounded<A: Send + Sync + 'static>(capacity: usize) -> (RxSourceSender<A>, Rx<A>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let sender = RxSourceSender { tx };
    let node = Rx::from_node(Arc::new(RxSourceNode {
        rx: tokio::sync::Mutex::new(Some(rx)),
    }));
    (sender, node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rx_expr::Mode;
    use rx_test_utils::TestSink;
    use std::time::Duration;

    fn ctx() -> RunCtx {
        RunCtx::new(rx_runtime::TokioScheduler::shared(), Mode::Continuous)
    }

    #[tokio::test]
    async fn delivers_sent_values_in_order_then_completes_on_drop() {
        let (sender, rx) = bounded::<i32>(4);
        let sink = TestSink::new();
        let _cancel = rx.subscribe(&ctx(), sink.sink());
        sender.send(1).await.unwrap();
        sender.send(2).await.unwrap();
        drop(sender);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sink.values(), vec![1, 2]);
        assert!(sink.completed());
    }

    #[tokio::test]
    async fn send_error_terminates_the_stream_with_that_error() {
        let (sender, rx) = bounded::<i32>(4);
        let sink = TestSink::new();
        let _cancel = rx.subscribe(&ctx(), sink.sink());
        sender.send(1).await.unwrap();
        sender.send_error(RxError::custom("boom")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sink.values(), vec![1]);
        assert!(sink.errored());
    }

    #[tokio::test]
    async fn a_second_subscription_while_the_first_is_live_errors_immediately() {
        let (_sender, rx) = bounded::<i32>(4);
        let first = TestSink::new();
        let _first_cancel = rx.subscribe(&ctx(), first.sink());
        let second = TestSink::new();
        let _second_cancel = rx.subscribe(&ctx(), second.sink());
        assert!(second.errored());
        assert!(second.values().is_empty());
    }

    #[tokio::test]
    async fn cancelling_the_subscription_reports_interrupted_to_the_puller() {
        let (_sender, rx) = bounded::<i32>(4);
        let sink = TestSink::new();
        let cancel = rx.subscribe(&ctx(), sink.sink());
        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sink.errored());
    }
}
