// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-level concurrency controller.
//!
//! One counter bounds total concurrent executions, one map bounds each
//! agent. Reservation is two-phase: the global slot is taken first and
//! rolled back if the per-agent check fails, so no interleaving of
//! concurrent callers can push either counter past its limit.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared slot state. Instance-scoped; nothing here is process-global.
#[derive(Debug)]
pub struct SlotController {
    max_concurrent: u32,
    global: Mutex<u32>,
    per_agent: Mutex<HashMap<String, u32>>,
}

impl SlotController {
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            global: Mutex::new(0),
            per_agent: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_concurrent(&self) -> u32 {
        self.max_concurrent
    }

    /// Try to take one global slot and one slot for `abbreviation`.
    ///
    /// The returned guard releases both counters on drop, which makes the
    /// release path exception-safe across every worker exit.
    pub fn reserve(
        self: &Arc<Self>,
        abbreviation: &str,
        max_parallel: u32,
    ) -> Option<SlotReservation> {
        {
            let mut global = self.global.lock();
            if *global >= self.max_concurrent {
                return None;
            }
            *global += 1;
        }

        {
            let mut per_agent = self.per_agent.lock();
            let count = per_agent.entry(abbreviation.to_string()).or_insert(0);
            if *count >= max_parallel {
                // Roll back the global increment taken above.
                *self.global.lock() -= 1;
                return None;
            }
            *count += 1;
        }

        Some(SlotReservation {
            slots: Arc::clone(self),
            abbreviation: abbreviation.to_string(),
        })
    }

    fn release(&self, abbreviation: &str) {
        {
            let mut global = self.global.lock();
            *global = global.saturating_sub(1);
        }
        let mut per_agent = self.per_agent.lock();
        if let Some(count) = per_agent.get_mut(abbreviation) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                per_agent.remove(abbreviation);
            }
        }
    }

    pub fn global_in_use(&self) -> u32 {
        *self.global.lock()
    }

    pub fn agent_in_use(&self, abbreviation: &str) -> u32 {
        self.per_agent
            .lock()
            .get(abbreviation)
            .copied()
            .unwrap_or(0)
    }
}

/// RAII guard for one reserved slot pair
#[derive(Debug)]
pub struct SlotReservation {
    slots: Arc<SlotController>,
    abbreviation: String,
}

impl SlotReservation {
    pub fn abbreviation(&self) -> &str {
        &self.abbreviation
    }
}

impl Drop for SlotReservation {
    fn drop(&mut self) {
        self.slots.release(&self.abbreviation);
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
