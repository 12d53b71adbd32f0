// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use serde_json::{json, Value};
pub use wb_client::{ready, ConnectivityGuard, CredentialedClient, ResponseFuture, Transport};
pub use wb_core::{BusEvent, ConnectionState, EventBus, ReconnectConfig, Request, RpcError};

/// In-process stand-in for the server that can be switched off.
#[derive(Clone)]
pub struct FlakyServer {
    up: Arc<AtomicBool>,
    log: Arc<Mutex<Vec<Request>>>,
}

impl FlakyServer {
    pub fn new() -> Self {
        FlakyServer { up: Arc::new(AtomicBool::new(true)), log: Arc::default() }
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.operation).collect()
    }
}

impl Transport for FlakyServer {
    fn call(&self, request: Request) -> ResponseFuture {
        let operation = request.operation.clone();
        self.log.lock().unwrap().push(request);

        if !self.up.load(Ordering::SeqCst) {
            return ready(Err(RpcError::connection("connection refused")));
        }
        match operation.as_str() {
            "wobble.api_version" => ready(Ok(json!(2))),
            "user_login" => ready(Ok(json!({"apikey": "K"}))),
            "user_get" => ready(Ok(json!({"id": 5, "name": "Ann"}))),
            _ => ready(Ok(json!({"ok": true}))),
        }
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Connectivity transitions received so far.
pub fn transitions(events: &mut tokio::sync::broadcast::Receiver<BusEvent>) -> Vec<ConnectionState> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BusEvent::ConnectionState(state) = event {
            seen.push(state);
        }
    }
    seen
}
