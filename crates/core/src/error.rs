// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for wb-core operations.

use thiserror::Error;

/// Errors from local infrastructure: the key-value store and configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corrupted store '{scope}': {reason}\n  hint: delete the file to reset stored values")]
    CorruptedStore { scope: String, reason: String },

    #[error("invalid store scope: '{0}'\n  hint: scopes are 1+ characters of [a-z0-9_-]")]
    InvalidScope(String),
}

/// A specialized Result type for wb-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a remote call.
///
/// Transports must report an unreachable link as [`RpcError::Connection`];
/// it is the only kind that drives the offline path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The server could not be reached or the link dropped mid-call.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server received the call and rejected it.
    #[error("remote error {code}: {message}")]
    Application { code: i64, message: String },

    /// The call was malformed and never left the client.
    #[error("invalid call: {0}")]
    Validation(String),

    /// The call was dropped before it could complete.
    #[error("call abandoned before completion")]
    Abandoned,
}

impl RpcError {
    /// Creates a connection error.
    pub fn connection(reason: impl Into<String>) -> Self {
        RpcError::Connection(reason.into())
    }

    /// Creates an application error.
    pub fn application(code: i64, message: impl Into<String>) -> Self {
        RpcError::Application { code, message: message.into() }
    }

    /// Creates a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        RpcError::Validation(reason.into())
    }

    /// Returns true for connection-class failures.
    pub fn is_connection(&self) -> bool {
        matches!(self, RpcError::Connection(_))
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RpcError::Connection(_) => "connectionerr",
            RpcError::Application { .. } => "application",
            RpcError::Validation(_) => "validation",
            RpcError::Abandoned => "abandoned",
        }
    }
}

/// Result of a remote call.
pub type RpcResult<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
