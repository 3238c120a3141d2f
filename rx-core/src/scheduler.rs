// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The one seam between the Rx runner and wall-clock time.
//!
//! Timed operators (`Interval`, `Timer`, `ThrottleFirst`, `ThrottleLast`,
//! `Timeout`) never touch a concrete executor directly — they go through a
//! [`Scheduler`] trait object, the same shape as the teacher's
//! `Runtime`/`Timer` split, collapsed into one object-safe trait so it can be
//! threaded through the operator tree as `Arc<dyn Scheduler>`.

use crate::cancelable::Cancelable;
use std::time::Duration;

/// The minimum delay/period honored by any scheduler implementation (§4.5).
pub const MIN_DELAY: Duration = Duration::from_millis(1);

fn clamp_delay(delay: Duration) -> Duration {
    delay.max(MIN_DELAY)
}

/// A repeating timer handle returned by [`Scheduler::new_timer`].
pub trait Timer: Send + Sync {
    /// Arm the timer to call `tick` every `period`, starting after the first
    /// `period` elapses. `tick` receives the 0-based tick index.
    fn schedule(&self, period: Duration, tick: Box<dyn Fn(u64) + Send + Sync>) -> Cancelable;
}

/// Host-provided clock and executor access.
///
/// Implementations must guarantee that a single subscription's timer
/// callbacks are delivered one at a time (§5: "the scheduler must guarantee
/// serial callback delivery per subscription").
pub trait Scheduler: Send + Sync {
    /// Monotonic nanosecond clock, independent of wall-clock adjustments.
    fn now_nanos(&self) -> i64;

    /// Invoke `f` once, at least `delay` from now (clamped to
    /// [`MIN_DELAY`]).
    fn schedule_once(&self, delay: Duration, f: Box<dyn FnOnce() + Send>) -> Cancelable;

    /// Build a fresh repeating timer bound to this scheduler.
    fn new_timer(&self) -> Box<dyn Timer>;
}

/// Helper for `Scheduler` implementors: clamps a requested delay/period to
/// the minimum observable precision.
#[must_use]
pub fn clamp(delay: Duration) -> Duration {
    clamp_delay(delay)
}
