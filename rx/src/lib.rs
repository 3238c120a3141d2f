// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Rx
//!
//! A reactive stream processing library built on an immutable expression
//! tree, cooperative (pull-driven) backpressure and ordered, at-most-once
//! delivery per subscription.
//!
//! ## Overview
//!
//! `rx` provides a high-level API for composing `Rx<A>` expressions —
//! sources, transforms, timed operators and combined-stream engines — and
//! running them under a [`Scheduler`](rx_core::Scheduler). It builds on
//! the Rust async ecosystem (Tokio) for wall-clock time and executors, and
//! adds explicit backpressure and a uniform `Event::{Next, Error,
//! Completion}` vocabulary across every operator.
//!
//! ## Design Philosophy
//!
//! The workspace keeps a clean separation of concerns:
//!
//! - **`rx-core`**: the vocabulary (`Event`, `RxResult`, `Cancelable`,
//!   `RxError`, `Scheduler`) every other crate agrees on.
//! - **`rx-expr`**: the immutable expression tree — building an `Rx<A>`
//!   never runs anything.
//! - **`rx-runtime`**: a concrete `Scheduler` wired to Tokio.
//! - **`rx` (this crate)**: the runner, the mutable hot sources
//!   (`RxVar`/`RxOptionVar`), the external bridge (`RxSource`), and the
//!   public prelude tying the rest together.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rx::prelude::*;
//! use std::sync::Arc;
//!
//! let scheduler = rx_runtime::TokioScheduler::shared();
//! let pipeline = Rx::from_seq(vec![1, 2, 3])
//!     .map(|n| n * 2)
//!     .filter(|n| *n > 2);
//! let events = rx::run_and_collect(&pipeline, scheduler);
//! assert!(events.iter().any(|e| e.is_completion()));
//! ```

pub mod future_source;
pub mod rx_source;
pub mod rx_var;
pub mod runner;

pub use future_source::future;
pub use rx_core::{Cancelable, Event, RxError, RxResult, Scheduler, Timer};
pub use rx_expr::{
    interval, join, join10, join2, join3, join4, join5, join6, join7, join8, join9,
    timer as timer_once, zip, zip10, zip2, zip3, zip4, zip5, zip6, zip7, zip8, zip9, Mode,
    OverflowStrategy, Rx, RunCtx,
};
pub use rx_source::{bounded as rx_source, RxSourceSender};
pub use rx_var::{RxOptionVar, RxVar};
pub use runner::{run, run_and_collect, run_continuously, run_once};

/// Convenient glob import: `use rx::prelude::*;` pulls in `Rx`, the
/// runner functions, `RxVar`/`RxOptionVar`, `RxSource`, and the core
/// vocabulary types.
pub mod prelude {
    pub use crate::{
        future, rx_source, run, run_and_collect, run_continuously, run_once, Cancelable, Event,
        Mode, OverflowStrategy, Rx, RxError, RxOptionVar, RxResult, RxSourceSender, RxVar,
        Scheduler, Timer,
    };
}
