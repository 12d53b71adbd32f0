// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Events published between the access layer and its collaborators.
//!
//! Components receive an [`EventPublisher`] at construction instead of
//! reaching for a global bus. [`EventBus`] is the stock implementation,
//! backed by a tokio broadcast channel.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::user::UserProfile;

/// Event name for connectivity transitions.
pub const CONNECTION_STATE: &str = "connection.state";
/// Event name for identity changes.
pub const API_USER: &str = "api.user";
/// Event name transports use to report a broken link.
pub const RPC_CONNECTION_ERROR: &str = "rpc.connectionerror";

const DEFAULT_CAPACITY: usize = 64;

/// Whether the server is currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Online,
    Offline,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Online => "online",
            ConnectionState::Offline => "offline",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusEvent {
    /// The guard changed connectivity state.
    ConnectionState(ConnectionState),
    /// The cached user changed; `None` after sign-out.
    User(Option<UserProfile>),
    /// A transport saw the link break.
    ConnectionError,
}

impl BusEvent {
    /// Wire-style name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            BusEvent::ConnectionState(_) => CONNECTION_STATE,
            BusEvent::User(_) => API_USER,
            BusEvent::ConnectionError => RPC_CONNECTION_ERROR,
        }
    }
}

/// Sink for published events.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: BusEvent);
}

/// Broadcast event bus.
///
/// Publishing never blocks; subscribers that fall behind observe a lag error
/// from their receiver and miss the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Creates a bus with the default buffer capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        EventBus { sender }
    }

    /// Subscribes to all events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    /// Reports a broken link; used by transports.
    pub fn fire_connection_error(&self) {
        self.publish(BusEvent::ConnectionError);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: BusEvent) {
        tracing::trace!("publishing {}", event.name());
        // No subscribers is not an error: nobody is listening yet.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
