// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The handle returned by every subscription.
//!
//! Modeled on the runtime-agnostic `CancellationToken` pattern: a shared,
//! clonable flag plus an [`event_listener::Event`] so async waiters (timers,
//! `RxSource` pullers) can be woken the moment `cancel()` runs. Unlike a bare
//! token, a [`Cancelable`] also owns an on-cancel action and can be merged
//! into a composite so that cancelling an outer subscription tears down
//! every child it spawned.

use event_listener::{Event, EventListener};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

struct Inner {
    cancelled: AtomicBool,
    event: Event,
    // Run at most once, in registration order, the first time cancel() wins.
    actions: Mutex<Vec<Box<dyn FnOnce() + Send>>>,
}

/// A composable, idempotent handle releasing everything a subscription
/// allocated: child subscriptions, timers and buffers (§3 invariant 3).
#[derive(Clone)]
pub struct Cancelable {
    inner: Arc<Inner>,
}

impl Cancelable {
    /// A handle with no attached action; cancelling it only flips its own
    /// flag. Useful for cold, already-finished subscriptions.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                event: Event::new(),
                actions: Mutex::new(Vec::new()),
            }),
        }
    }

    /// A handle that runs `action` the first time it is cancelled.
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        let this = Self::noop();
        this.on_cancel(action);
        this
    }

    /// Register an action to run when this handle is cancelled. If it is
    /// already cancelled, the action runs immediately, inline.
    pub fn on_cancel(&self, action: impl FnOnce() + Send + 'static) {
        if self.is_cancelled() {
            action();
            return;
        }
        let mut actions = self.inner.actions.lock();
        // Re-check under the lock: cancel() drains `actions` before flipping
        // the flag would be visible here, so this can't race a concurrent
        // cancel() into silently dropping the action.
        if self.is_cancelled() {
            drop(actions);
            action();
        } else {
            actions.push(Box::new(action));
        }
    }

    /// Tear the subscription down. Idempotent: the second and later calls
    /// are no-ops. After this returns, no further sink calls occur except
    /// those already in flight on the same thread (§5).
    pub fn cancel(&self) {
        if self
            .inner
            .cancelled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let actions = std::mem::take(&mut *self.inner.actions.lock());
        for action in actions {
            action();
        }
        self.inner.event.notify(usize::MAX);
    }

    /// Non-blocking check of cancellation state.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Await cancellation. Resolves immediately if already cancelled.
    #[must_use]
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            handle: self.clone(),
            listener: None,
        }
    }

    /// Build a composite handle: cancelling it cancels every child, and it
    /// reports cancelled once *any* child has been cancelled directly (the
    /// fan-out is one-directional — cancelling a child alone does not flip
    /// the composite's own flag, matching "cancellation flows downward").
    #[must_use]
    pub fn merge(children: impl IntoIterator<Item = Cancelable>) -> Self {
        let children: Vec<_> = children.into_iter().collect();
        Self::new(move || {
            for child in children {
                child.cancel();
            }
        })
    }
}

impl Default for Cancelable {
    fn default() -> Self {
        Self::noop()
    }
}

/// Future returned by [`Cancelable::cancelled`].
pub struct Cancelled {
    handle: Cancelable,
    listener: Option<EventListener>,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.handle.is_cancelled() {
            return Poll::Ready(());
        }
        if self.listener.is_none() {
            self.listener = Some(self.handle.inner.event.listen());
            if self.handle.is_cancelled() {
                return Poll::Ready(());
            }
        }
        match Pin::new(self.listener.as_mut().expect("just initialized")).poll(cx) {
            Poll::Ready(()) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn cancel_runs_action_once() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let handle = Cancelable::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        handle.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn merge_cancels_all_children() {
        let flags: Vec<_> = (0..3).map(|_| Arc::new(AtomicBool::new(false))).collect();
        let children: Vec<_> = flags
            .iter()
            .map(|f| {
                let f = f.clone();
                Cancelable::new(move || f.store(true, Ordering::SeqCst))
            })
            .collect();
        let composite = Cancelable::merge(children);
        composite.cancel();
        assert!(flags.iter().all(|f| f.load(Ordering::SeqCst)));
    }

    #[test]
    fn on_cancel_after_cancel_runs_immediately() {
        let handle = Cancelable::noop();
        handle.cancel();
        let ran = Arc::new(AtomicBool::new(false));
        let r = ran.clone();
        handle.on_cancel(move || r.store(true, Ordering::SeqCst));
        assert!(ran.load(Ordering::SeqCst));
    }
}
