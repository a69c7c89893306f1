// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! vo-engine: dispatch engine for the Vault Orchestrator.
//!
//! The event loop consumes watcher events, matches them against the agent
//! registry, reserves capacity, and hands each admitted execution to a
//! worker task. Denied reservations are persisted as queued task files and
//! drained FIFO, one per loop pass.

mod error;
mod orchestrator;
mod runner;
mod slots;

pub use error::RuntimeError;
pub use orchestrator::Orchestrator;
pub use runner::{ExecutionContext, Runner};
pub use slots::{SlotController, SlotReservation};
