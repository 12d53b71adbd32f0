// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote call requests.
//!
//! A [`Request`] names a remote operation and optionally carries a
//! [`Params`] object. The two call forms are explicit: `Request::new` for
//! calls with parameters and `Request::bare` for calls without.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RpcError, RpcResult};

/// Named parameters of a remote call (a JSON object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// Creates an empty parameter object.
    pub fn new() -> Self {
        Params(Map::new())
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a parameter, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts a JSON value into parameters.
    ///
    /// Only objects are accepted.
    pub fn from_value(value: Value) -> RpcResult<Self> {
        match value {
            Value::Object(map) => Ok(Params(map)),
            other => Err(RpcError::validation(format!(
                "parameters must be an object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Returns the parameters as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Params(map)
    }
}

/// A single remote call: operation name plus optional parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Remote operation name, e.g. `user_get`.
    pub operation: String,
    /// Parameters, absent for the bare call form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
}

impl Request {
    /// Creates a request that carries parameters.
    pub fn new(operation: impl Into<String>, params: Params) -> Self {
        Request { operation: operation.into(), params: Some(params) }
    }

    /// Creates a request without parameters.
    pub fn bare(operation: impl Into<String>) -> Self {
        Request { operation: operation.into(), params: None }
    }

    /// Checks that the request can be sent.
    pub fn validate(&self) -> RpcResult<()> {
        if self.operation.trim().is_empty() {
            return Err(RpcError::validation("operation name must not be empty"));
        }
        Ok(())
    }

    /// Returns a parameter value, if present.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|p| p.get(key))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
