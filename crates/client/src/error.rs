// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the credentialed client.

use thiserror::Error;
use wb_core::RpcError;

/// Error from a client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The remote call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The credential store failed.
    #[error("credential store error: {0}")]
    Store(#[from] wb_core::Error),

    /// The client was built without a required piece.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The server answered with something the client cannot use.
    #[error("invalid response to {operation}: {reason}")]
    InvalidResponse { operation: String, reason: String },
}

impl ClientError {
    /// Returns true when the underlying call hit a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, ClientError::Rpc(err) if err.is_connection())
    }

    /// The remote call failure, if this is one.
    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            ClientError::Rpc(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
