// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The API key, cached in memory and mirrored to a key-value store.

use std::sync::{Arc, Mutex, MutexGuard};

use wb_core::KeyValueStore;

/// Holds the current credential.
///
/// Reads come from memory. Writes update memory first and then the store, so
/// a failing store never leaves the client sending a stale key.
pub struct CredentialSlot {
    key: String,
    store: Arc<dyn KeyValueStore>,
    value: Mutex<Option<String>>,
}

impl CredentialSlot {
    /// Loads the credential stored under `key`. An empty stored value counts
    /// as none.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> wb_core::Result<Self> {
        let key = key.into();
        let value = store.get(&key)?.filter(|v| !v.is_empty());
        Ok(CredentialSlot { key, store, value: Mutex::new(value) })
    }

    /// Store key the credential lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    /// Replaces the credential. Setting an empty string clears it.
    pub fn set(&self, credential: &str) -> wb_core::Result<()> {
        if credential.is_empty() {
            return self.clear();
        }
        *self.lock() = Some(credential.to_string());
        self.store.set(&self.key, credential)
    }

    /// Forgets the credential. Memory is cleared even if the store fails.
    pub fn clear(&self) -> wb_core::Result<()> {
        *self.lock() = None;
        self.store.remove(&self.key)
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
