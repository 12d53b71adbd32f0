// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for remote calls.
//!
//! The access layer never touches the wire itself. Anything that can issue a
//! named call and report its outcome implements [`Transport`]: a raw RPC
//! channel, a mock in tests, or a [`ConnectivityGuard`] stacked on top of
//! another transport.
//!
//! [`ConnectivityGuard`]: crate::ConnectivityGuard

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use wb_core::{Request, RpcResult};

/// Outcome of an issued call.
pub type ResponseFuture = Pin<Box<dyn Future<Output = RpcResult<Value>> + Send + 'static>>;

/// Issues remote calls.
///
/// A request counts as sent once [`Transport::call`] returns; the returned
/// future only waits for the outcome. Implementations must not defer sending
/// until the future is polled, otherwise submission order is lost.
///
/// A broken link must surface as [`RpcError::Connection`](wb_core::RpcError::Connection).
pub trait Transport: Send + Sync {
    fn call(&self, request: Request) -> ResponseFuture;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn call(&self, request: Request) -> ResponseFuture {
        (**self).call(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn call(&self, request: Request) -> ResponseFuture {
        (**self).call(request)
    }
}

/// Wraps an already known outcome.
pub fn ready(result: RpcResult<Value>) -> ResponseFuture {
    Box::pin(std::future::ready(result))
}
