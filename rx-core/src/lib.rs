// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Core types shared by every crate in the Rx workspace: the three-shape
//! [`Event`], the [`RxResult`] demand signal, the [`Cancelable`] handle, the
//! [`RxError`] hierarchy and the [`Scheduler`]/[`Timer`] contract that the
//! runner uses to reach wall-clock time.
//!
//! Nothing in this crate knows how to build or run an expression tree — that
//! is `rx-expr` and `rx`. This crate only fixes the vocabulary so that every
//! operator agrees on what a `Next`, an `Error`, a demand signal and a
//! cancellation mean.

#![allow(clippy::multiple_crate_versions)]

pub mod cancelable;
pub mod error;
pub mod event;
pub mod rx_result;
pub mod scheduler;

pub use cancelable::{Cancelable, Cancelled};
pub use error::{guard_callback, Result, RxError};
pub use event::Event;
pub use rx_result::RxResult;
pub use scheduler::{Scheduler, Timer, MIN_DELAY};
