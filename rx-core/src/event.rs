// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The three-shape event emitted by every Rx subscription.

use crate::error::RxError;

/// An event flowing downstream through a subscription.
///
/// Exactly three shapes exist; operators forward or consume them according to
/// the rules in each operator's own module (`Map` passes all three through
/// unchanged, `Filter` turns a rejected value into a `Completion`, `Recover`
/// turns a matched `Error` into a `Next`, and so on).
#[derive(Debug, Clone)]
pub enum Event<A> {
    /// A value produced by the source or an upstream transform.
    Next(A),
    /// A terminal failure. Propagates downstream until consumed by
    /// `Recover`/`RecoverWith`/`TapOn`/`Transform*` or until it reaches the
    /// sink.
    Error(RxError),
    /// A terminal, value-less marker. Suppressed by `FlatMap` bodies and by
    /// `Filter`'s rejected path (which emits it without tearing down the
    /// outer subscription).
    Completion,
}

impl<A> Event<A> {
    /// `true` for `Next`.
    #[must_use]
    pub const fn is_next(&self) -> bool {
        matches!(self, Event::Next(_))
    }

    /// `true` for `Error`.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    /// `true` for `Completion`.
    #[must_use]
    pub const fn is_completion(&self) -> bool {
        matches!(self, Event::Completion)
    }

    /// `true` for either terminal shape (`Error` or `Completion`).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_next()
    }

    /// Map the payload of a `Next`, passing `Error`/`Completion` through.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> Event<B> {
        match self {
            Event::Next(v) => Event::Next(f(v)),
            Event::Error(e) => Event::Error(e),
            Event::Completion => Event::Completion,
        }
    }

    /// Borrow the `Next` payload, if any.
    pub const fn as_next(&self) -> Option<&A> {
        match self {
            Event::Next(v) => Some(v),
            _ => None,
        }
    }
}
