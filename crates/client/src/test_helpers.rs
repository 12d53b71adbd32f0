// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for client tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use wb_core::{BusEvent, ConnectionState, EventPublisher, ReconnectConfig};

use crate::guard::ConnectivityGuard;
use crate::scheduler_tests::ManualScheduler;
use crate::transport_tests::MockTransport;

/// Publisher that remembers every event.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<BusEvent>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Only the connectivity transitions, in order.
    pub fn transitions(&self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                BusEvent::ConnectionState(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: BusEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A guard over `transport` with a manual scheduler and recorded events.
pub struct GuardFixture {
    pub guard: ConnectivityGuard<MockTransport>,
    pub transport: MockTransport,
    pub scheduler: Arc<ManualScheduler>,
    pub events: RecordingPublisher,
}

pub fn make_guard() -> GuardFixture {
    let transport = MockTransport::new();
    let scheduler = ManualScheduler::new();
    let events = RecordingPublisher::new();

    let guard = ConnectivityGuard::with_scheduler(
        transport.clone(),
        &ReconnectConfig::default(),
        Arc::new(events.clone()),
        scheduler.clone(),
    );

    GuardFixture { guard, transport, scheduler, events }
}

/// Let spawned completion tasks run.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
