// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The Rx expression tree: the immutable `Rx<A>` algebra of source,
//! unary, timed, backpressure and combinator nodes.
//!
//! Nothing in this crate runs on its own — `rx::run`/`run_once`/
//! `run_continuously` in the `rx` crate drive a [`rx::RunCtx`] through
//! [`rx::Rx::subscribe`]. This crate only builds the tree and knows how
//! each node reacts to a subscription.

pub mod backpressure;
pub mod cache;
pub mod combine;
pub mod concat;
pub mod filter;
pub mod flat_map;
pub mod last;
pub mod map;
pub mod named;
pub mod recover;
pub mod rx;
pub mod rx_option;
pub mod sources;
pub mod take;
pub mod tap_on;
pub mod timed;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use backpressure::OverflowStrategy;
pub use combine::{
    join, join10, join2, join3, join4, join5, join6, join7, join8, join9, zip, zip10, zip2, zip3,
    zip4, zip5, zip6, zip7, zip8, zip9,
};
pub use rx::{Mode, Rx, RunCtx, RxNode, SinkFn};
pub use timed::{interval, timer};
