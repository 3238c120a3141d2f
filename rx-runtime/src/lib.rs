// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Tokio-backed [`Scheduler`](rx_core::Scheduler) for the Rx runtime.

pub mod tokio_scheduler;

pub use tokio_scheduler::TokioScheduler;
