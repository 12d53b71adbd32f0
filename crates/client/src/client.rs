// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Credentialed client: attaches the API key to calls and tracks the
//! signed-in user.
//!
//! The client sits on top of any [`Transport`], normally a
//! [`ConnectivityGuard`](crate::ConnectivityGuard). The credential is read
//! when a call is submitted, so a call queued while offline replays with the
//! key it was submitted with even if the user signs out in between.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, warn};
use wb_core::{
    default_store_dir, BusEvent, ClientConfig, ClockSource, EventBus, EventPublisher, FileStore,
    KeyValueStore, MemoryStore, Params, Request, RpcError, SystemClock, UserId, UserProfile,
};

use crate::credential::CredentialSlot;
use crate::error::{ClientError, ClientResult};
use crate::transport::{ResponseFuture, Transport};

/// Parameter name the credential travels under.
pub const CREDENTIAL_PARAM: &str = "apikey";

const DEFAULT_CREDENTIAL_KEY: &str = "WOBBLEAPI_APIKEY";

/// Client that authenticates calls with a stored API key.
pub struct CredentialedClient<T: Transport> {
    transport: T,
    credential: CredentialSlot,
    user: Mutex<Option<UserProfile>>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn ClockSource>,
}

/// Builder for [`CredentialedClient`].
pub struct ClientBuilder<T> {
    transport: Option<T>,
    store: Option<Arc<dyn KeyValueStore>>,
    events: Option<Arc<dyn EventPublisher>>,
    clock: Option<Arc<dyn ClockSource>>,
    credential_key: String,
    /// Scope of the file store opened at build time when no store is given.
    store_scope: Option<String>,
    store_dir: Option<PathBuf>,
}

impl<T: Transport> ClientBuilder<T> {
    pub fn new() -> Self {
        ClientBuilder {
            transport: None,
            store: None,
            events: None,
            clock: None,
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            store_scope: None,
            store_dir: None,
        }
    }

    /// Transport calls are sent through. Required.
    pub fn transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Store the credential persists in. Defaults to an in-memory store.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Where `api.user` events go. Defaults to a private [`EventBus`].
    pub fn events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Store key the credential lives under.
    pub fn credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    /// Directory for the file store opened from a configuration. Defaults
    /// to [`default_store_dir`].
    pub fn store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// Apply settings from a loaded configuration.
    ///
    /// Unless a store is set explicitly, the credential persists in a
    /// [`FileStore`] for `config.store_scope`.
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.store_scope = Some(config.store_scope.clone());
        self.credential_key(config.credential_key.clone())
    }

    /// Build the client, loading any stored credential.
    pub fn build(self) -> ClientResult<CredentialedClient<T>> {
        let transport = self.transport.ok_or_else(|| {
            ClientError::Configuration("a transport is required to build the client".to_string())
        })?;
        if self.credential_key.is_empty() {
            return Err(ClientError::Configuration("credential key must not be empty".to_string()));
        }

        let store: Arc<dyn KeyValueStore> = match (self.store, self.store_scope) {
            (Some(store), _) => store,
            (None, Some(scope)) => {
                let dir = self.store_dir.unwrap_or_else(default_store_dir);
                Arc::new(FileStore::open(&dir, &scope)?)
            }
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let credential = CredentialSlot::load(store, self.credential_key)?;

        Ok(CredentialedClient {
            transport,
            credential,
            user: Mutex::new(None),
            events: self.events.unwrap_or_else(|| Arc::new(EventBus::new())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}

impl<T: Transport> Default for ClientBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> CredentialedClient<T> {
    pub fn builder() -> ClientBuilder<T> {
        ClientBuilder::new()
    }

    /// The transport calls go through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `operation` with `params`, adding the credential if one is set.
    pub fn call(&self, operation: &str, params: Params) -> ResponseFuture {
        self.send(operation, Some(params))
    }

    /// Call `operation` without arguments. The request carries only the
    /// credential, or no params at all when signed out.
    pub fn call_bare(&self, operation: &str) -> ResponseFuture {
        self.send(operation, None)
    }

    fn send(&self, operation: &str, params: Option<Params>) -> ResponseFuture {
        let params = match (params, self.credential.get()) {
            (Some(mut params), Some(key)) => {
                params.insert(CREDENTIAL_PARAM, key);
                Some(params)
            }
            (None, Some(key)) => Some(Params::new().with(CREDENTIAL_PARAM, key)),
            (params, None) => params,
        };
        self.transport.call(Request { operation: operation.to_string(), params })
    }

    /// The current credential, if any.
    pub fn credential(&self) -> Option<String> {
        self.credential.get()
    }

    /// Id of the cached user, if any.
    pub fn current_user_id(&self) -> Option<UserId> {
        self.user().as_ref().map(|user| user.id.clone())
    }

    /// The cached user profile, if any.
    pub fn current_user(&self) -> Option<UserProfile> {
        self.user().clone()
    }

    /// Generate a locally unique id for a new object, prefixed with the
    /// current user's id (`null` when nobody is cached).
    pub fn generate_id(&self) -> String {
        wb_core::id::generate_id(self.current_user_id().as_ref(), &self.clock)
    }

    /// Log in and keep the returned credential.
    ///
    /// The current credential, if any, is attached to the login call. On
    /// failure the stored credential is left alone.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Value> {
        if email.is_empty() {
            return Err(RpcError::validation("email must not be empty").into());
        }

        let params = Params::new().with("email", email).with("password", password);
        let result = self.call("user_login", params).await?;
        self.keep_credential(&result)?;
        Ok(result)
    }

    /// Register a new account and keep the returned credential.
    ///
    /// Sent without the current credential.
    pub async fn register(&self, email: &str, password: &str) -> ClientResult<Value> {
        if email.is_empty() {
            return Err(RpcError::validation("email must not be empty").into());
        }

        let params = Params::new().with("email", email).with("password", password);
        let result = self.transport.call(Request::new("user_register", params)).await?;
        self.keep_credential(&result)?;
        Ok(result)
    }

    /// Sign out.
    ///
    /// The credential and cached user are cleared whatever the server says,
    /// and `api.user` is published with no user. A failed call is still
    /// reported to the caller.
    pub async fn sign_out(&self) -> ClientResult<Value> {
        let result = self.call_bare("user_signout").await;

        let cleared = self.credential.clear();
        if let Err(err) = &cleared {
            warn!("failed to remove stored credential {}: {}", self.credential.key(), err);
        }
        *self.user() = None;
        self.events.publish(BusEvent::User(None));

        let value = result?;
        cleared?;
        Ok(value)
    }

    /// Fetch the signed-in user and publish it as `api.user`.
    ///
    /// On error the previously cached profile stays.
    pub async fn refresh_user(&self) -> ClientResult<UserProfile> {
        let value = self.user_get().await?;
        let profile = UserProfile::from_value(value).map_err(|e| ClientError::InvalidResponse {
            operation: "user_get".to_string(),
            reason: e.to_string(),
        })?;

        debug!("refreshed user {}", profile.id);
        *self.user() = Some(profile.clone());
        self.events.publish(BusEvent::User(Some(profile.clone())));
        Ok(profile)
    }

    /// Refresh the user if a credential was stored by an earlier session.
    pub async fn resume(&self) -> ClientResult<Option<UserProfile>> {
        if !self.credential.is_set() {
            return Ok(None);
        }
        self.refresh_user().await.map(Some)
    }

    /// Keep the `apikey` from a login or register result, if it has one.
    fn keep_credential(&self, result: &Value) -> ClientResult<()> {
        match result.get(CREDENTIAL_PARAM).and_then(Value::as_str) {
            Some(key) if !key.is_empty() => {
                self.credential.set(key)?;
                debug!("stored new credential");
            }
            _ => debug!("response carried no credential"),
        }
        Ok(())
    }

    fn user(&self) -> MutexGuard<'_, Option<UserProfile>> {
        self.user.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
