// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Task scheduling for background work.
//!
//! The guard never sleeps or spawns directly; it hands tasks to a
//! [`Scheduler`]. Production code uses [`TokioScheduler`]. Tests substitute a
//! scheduler that holds delayed tasks until the test releases them.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// A unit of background work.
pub type Task = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs background tasks, immediately or after a delay.
pub trait Scheduler: Send + Sync {
    /// Run `task` in the background as soon as possible.
    fn spawn(&self, task: Task);

    /// Run `task` in the background once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Scheduler backed by the ambient tokio runtime.
///
/// Must be used from within a runtime. Cancelling the scheduler drops every
/// delayed task that has not started yet; tasks passed to `spawn` always run.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    cancel_token: CancellationToken,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cancellation token for this scheduler.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Drop all pending delayed tasks and refuse new ones.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl Scheduler for TokioScheduler {
    fn spawn(&self, task: Task) {
        tokio::spawn(task);
    }

    fn schedule(&self, delay: Duration, task: Task) {
        let cancel_token = self.cancel_token.clone();
        if cancel_token.is_cancelled() {
            tracing::debug!("scheduler cancelled, dropping task");
            return;
        }

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });
    }
}
