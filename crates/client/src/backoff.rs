// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capped linear backoff between reconnection probes.
//!
//! Delay before probe *k* (counting from 0 since going offline) is
//! `base + min(k, max_steps) * step`.

use std::time::Duration;

use wb_core::ReconnectConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    step: Duration,
    max_steps: u32,
    /// Retry counter; never exceeds `max_steps`.
    attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, step: Duration, max_steps: u32) -> Self {
        Backoff { base, step, max_steps, attempts: 0 }
    }

    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self::new(config.base_delay(), config.backoff_step(), config.max_retry_steps)
    }

    /// Returns the delay for the next probe and advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        let steps = self.attempts.min(self.max_steps);
        self.attempts = self.attempts.saturating_add(1).min(self.max_steps);
        self.base.saturating_add(self.step.saturating_mul(steps))
    }

    /// Current value of the retry counter.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Longest delay this backoff will ever produce.
    pub fn max_delay(&self) -> Duration {
        self.base.saturating_add(self.step.saturating_mul(self.max_steps))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ReconnectConfig::default())
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
