// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! wb-core: Shared building blocks for the wobble client access layer
//!
//! This crate provides the request model, error taxonomy, event bus,
//! persistent key-value store and configuration used by `wb-client`.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod request;
pub mod store;
pub mod user;

pub use clock::{ClockSource, SystemClock};
pub use config::{default_store_dir, ClientConfig, ReconnectConfig};
pub use error::{Error, Result, RpcError, RpcResult};
pub use event::{BusEvent, ConnectionState, EventBus, EventPublisher};
pub use request::{Params, Request};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use user::{UserId, UserProfile};
