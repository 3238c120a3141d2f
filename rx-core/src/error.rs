// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the Rx runtime.
//!
//! This crate provides a single root error type, [`RxError`], covering every
//! failure mode the runner can surface on an `Event::Error` path: user
//! callbacks that threw, timed operators that fired, and backpressure buffers
//! that overflowed.

use std::time::Duration;

/// Root error type carried by `Event::Error`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RxError {
    /// A user-supplied callback (map/filter/tap/flatMap/…) threw.
    #[error("callback panicked: {context}")]
    Callback {
        /// Description of the callback and the value that triggered it.
        context: String,
    },

    /// A `Timeout(duration)` operator fired because its input produced no
    /// event within the window.
    #[error("operation timed out after {duration:?}")]
    Timeout {
        /// The configured timeout window.
        duration: Duration,
    },

    /// A `BackpressureBuffer` with the `Error` overflow strategy exceeded its
    /// capacity.
    #[error("backpressure buffer overflowed (capacity: {capacity})")]
    Overflow {
        /// The buffer's configured capacity.
        capacity: usize,
    },

    /// A subscription was torn down by `cancel()` while an `RxSource` puller
    /// was waiting for the next event.
    #[error("subscription was interrupted by cancellation")]
    Interrupted,

    /// A combined-stream engine (zip/join) aggregated more than one upstream
    /// error; `primary` is surfaced to the sink and `suppressed` records the
    /// rest in arrival order.
    #[error("{primary}")]
    Aggregate {
        /// The first error observed; this is the one rendered by `Display`.
        primary: Box<RxError>,
        /// Additional errors observed after the primary, oldest first.
        suppressed: Vec<RxError>,
    },

    /// An `Exception` leaf source, or any other explicitly constructed error
    /// value that does not fit a more specific variant.
    #[error("{message}")]
    Custom {
        /// Free-form error message.
        message: String,
    },
}

impl RxError {
    /// Build a [`RxError::Callback`] from a caught panic payload.
    pub fn from_panic(context: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Callback {
            context: format!("{}: {detail}", context.into()),
        }
    }

    /// Construct a timeout error for the given window.
    #[must_use]
    pub const fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    /// Construct an overflow error for the given capacity.
    #[must_use]
    pub const fn overflow(capacity: usize) -> Self {
        Self::Overflow { capacity }
    }

    /// Wrap a free-form message in a [`RxError::Custom`].
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }

    /// Fold a non-empty sequence of errors into a single `Aggregate`,
    /// preserving arrival order. Panics if `errors` is empty — callers only
    /// invoke this once at least one error slot is known to be populated.
    #[must_use]
    pub fn aggregate(mut errors: Vec<RxError>) -> Self {
        assert!(!errors.is_empty(), "aggregate requires at least one error");
        let primary = errors.remove(0);
        if errors.is_empty() {
            primary
        } else {
            Self::Aggregate {
                primary: Box::new(primary),
                suppressed: errors,
            }
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RxError>;

/// Run a user callback, converting any panic into `RxError::Callback` instead
/// of unwinding across operator boundaries (§4.1.2: "every user callback …
/// must be wrapped so that a thrown exception becomes an `Error(e)` event").
///
/// Fatal aborts (stack overflow, explicit `abort()`) are not caught by
/// `catch_unwind` and are intentionally left to propagate.
pub fn guard_callback<F, T>(context: &str, f: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f))
        .map_err(|payload| RxError::from_panic(context, payload.as_ref()))
}
