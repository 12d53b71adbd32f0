// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! wb-client: Resilient, authenticated access to the wobble RPC server.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐     ┌────────────────────┐     ┌─────────────┐
//! │ CredentialedClient │────►│ ConnectivityGuard  │────►│  Transport  │──► server
//! │  (apikey, user)    │◄────│ (queue, probing)   │◄────│   (trait)   │
//! └────────────────────┘     └────────────────────┘     └─────────────┘
//!           │                          │
//!           ▼                          ▼
//! ┌────────────────────┐     ┌────────────────────┐
//! │   KeyValueStore    │     │     Scheduler      │  (probe timers)
//! └────────────────────┘     └────────────────────┘
//! ```
//!
//! # Features
//!
//! - Offline queue with FIFO replay once the server is reachable again
//! - Reconnection probes with capped linear backoff
//! - API key attached to every call and persisted across restarts
//! - Cached user profile published on the event bus
//! - Injectable transport and scheduler for testing

mod api;
mod backoff;
mod client;
mod credential;
mod error;
mod guard;
mod scheduler;
mod transport;

pub use backoff::Backoff;
pub use client::{ClientBuilder, CredentialedClient, CREDENTIAL_PARAM};
pub use credential::CredentialSlot;
pub use error::{ClientError, ClientResult};
pub use guard::ConnectivityGuard;
pub use scheduler::{Scheduler, Task, TokioScheduler};
pub use transport::{ready, ResponseFuture, Transport};

#[cfg(test)]
mod test_helpers;
