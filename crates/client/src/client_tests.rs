// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use crate::test_helpers::{make_guard, RecordingPublisher};
use crate::transport_tests::MockTransport;
use serde_json::json;
use tempfile::tempdir;
use wb_core::{FileStore, MemoryStore};

const KEY: &str = "WOBBLEAPI_APIKEY";

struct FixedClock(u64);

impl ClockSource for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
}

struct Fixture {
    client: CredentialedClient<MockTransport>,
    transport: MockTransport,
    store: Arc<MemoryStore>,
    events: RecordingPublisher,
}

fn make_client(stored: Option<&str>) -> Fixture {
    let transport = MockTransport::new();
    let store = Arc::new(MemoryStore::new());
    if let Some(key) = stored {
        store.set(KEY, key).unwrap();
    }
    let events = RecordingPublisher::new();

    let client = CredentialedClient::builder()
        .transport(transport.clone())
        .store(store.clone())
        .events(Arc::new(events.clone()))
        .clock(Arc::new(FixedClock(1_700_000_000_000)))
        .build()
        .unwrap();

    Fixture { client, transport, store, events }
}

fn sent_apikey(request: &Request) -> Option<String> {
    request.param(CREDENTIAL_PARAM).and_then(Value::as_str).map(str::to_string)
}

#[test]
fn test_build_without_transport_fails() {
    let result = CredentialedClient::<MockTransport>::builder().build();

    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[test]
fn test_build_with_empty_credential_key_fails() {
    let result = CredentialedClient::builder()
        .transport(MockTransport::new())
        .credential_key("")
        .build();

    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[test]
fn test_build_uses_configured_credential_key() {
    let store = Arc::new(MemoryStore::new());
    store.set("OTHER_KEY", "k1").unwrap();
    let config = ClientConfig { credential_key: "OTHER_KEY".to_string(), ..ClientConfig::default() };

    let client = CredentialedClient::builder()
        .transport(MockTransport::new())
        .store(store)
        .config(&config)
        .build()
        .unwrap();

    assert_eq!(client.credential().as_deref(), Some("k1"));
}

#[tokio::test]
async fn test_calls_without_credential_carry_no_apikey() {
    let fx = make_client(None);

    fx.client.call("topics_list", Params::new().with("archived", false)).await.unwrap();
    fx.client.call_bare("user_get").await.unwrap();

    let calls = fx.transport.calls();
    assert_eq!(sent_apikey(&calls[0]), None);
    assert_eq!(calls[0].param("archived"), Some(&json!(false)));
    assert_eq!(calls[1].params, None);
}

#[tokio::test]
async fn test_stored_credential_is_attached() {
    let fx = make_client(Some("abc"));

    fx.client.call("topics_list", Params::new().with("archived", true)).await.unwrap();
    fx.client.call_bare("user_get").await.unwrap();

    let calls = fx.transport.calls();
    assert_eq!(sent_apikey(&calls[0]).as_deref(), Some("abc"));
    assert_eq!(calls[0].param("archived"), Some(&json!(true)));
    assert_eq!(calls[1].params, Some(Params::new().with(CREDENTIAL_PARAM, "abc")));
}

#[tokio::test]
async fn test_login_stores_credential_for_next_call() {
    let fx = make_client(None);
    fx.transport.respond("user_login", Ok(json!({"apikey": "XYZ"})));

    let result = fx.client.login("a@b.com", "pw").await.unwrap();
    assert_eq!(result, json!({"apikey": "XYZ"}));

    let login = fx.transport.last_call().unwrap();
    assert_eq!(login.param("email"), Some(&json!("a@b.com")));
    assert_eq!(login.param("password"), Some(&json!("pw")));

    fx.client.call("topics_list", Params::new()).await.unwrap();
    assert_eq!(sent_apikey(&fx.transport.last_call().unwrap()).as_deref(), Some("XYZ"));
    assert_eq!(fx.store.get(KEY).unwrap().as_deref(), Some("XYZ"));
}

#[tokio::test]
async fn test_login_failure_keeps_existing_credential() {
    let fx = make_client(Some("old"));
    fx.transport.respond("user_login", Err(RpcError::application(401, "bad password")));

    let err = fx.client.login("a@b.com", "wrong").await.unwrap_err();

    assert!(matches!(err, ClientError::Rpc(RpcError::Application { code: 401, .. })));
    assert_eq!(fx.client.credential().as_deref(), Some("old"));
    // The existing credential rides along on the login call
    assert_eq!(sent_apikey(&fx.transport.last_call().unwrap()).as_deref(), Some("old"));
}

#[tokio::test]
async fn test_login_without_apikey_in_result_keeps_credential() {
    let fx = make_client(Some("old"));
    fx.transport.respond("user_login", Ok(json!({"status": "ok"})));

    fx.client.login("a@b.com", "pw").await.unwrap();

    assert_eq!(fx.client.credential().as_deref(), Some("old"));
}

#[tokio::test]
async fn test_login_with_empty_email_is_rejected() {
    let fx = make_client(None);

    let err = fx.client.login("", "pw").await.unwrap_err();

    assert!(matches!(err, ClientError::Rpc(RpcError::Validation(_))));
    assert!(fx.transport.calls().is_empty());
}

#[tokio::test]
async fn test_register_sends_no_credential_and_stores_new_one() {
    let fx = make_client(Some("old"));
    fx.transport.respond("user_register", Ok(json!({"apikey": "NEW"})));

    fx.client.register("new@b.com", "pw").await.unwrap();

    let register = fx.transport.last_call().unwrap();
    assert_eq!(register.operation, "user_register");
    assert_eq!(sent_apikey(&register), None);
    assert_eq!(fx.client.credential().as_deref(), Some("NEW"));
}

#[tokio::test]
async fn test_sign_out_clears_credential_and_user() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_get", Ok(json!({"id": 7, "name": "Ann"})));
    fx.client.refresh_user().await.unwrap();

    fx.client.sign_out().await.unwrap();

    assert_eq!(sent_apikey(&fx.transport.last_call().unwrap()).as_deref(), Some("abc"));
    assert_eq!(fx.client.credential(), None);
    assert_eq!(fx.client.current_user(), None);
    assert_eq!(fx.events.events().last(), Some(&BusEvent::User(None)));
}

#[tokio::test]
async fn test_rejected_sign_out_still_clears_credential() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_signout", Err(RpcError::application(500, "server error")));

    let err = fx.client.sign_out().await.unwrap_err();

    assert!(matches!(err, ClientError::Rpc(RpcError::Application { code: 500, .. })));
    assert_eq!(fx.client.credential(), None);
    assert_eq!(fx.store.get(KEY).unwrap(), None);
    assert_eq!(fx.events.events(), vec![BusEvent::User(None)]);

    // Next call goes out without a key
    fx.client.call_bare("user_get").await.unwrap();
    assert_eq!(fx.transport.last_call().unwrap().params, None);
}

#[tokio::test]
async fn test_refresh_user_caches_and_publishes() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_get", Ok(json!({"id": 42, "name": "Ann", "email": "a@b.com"})));

    let profile = fx.client.refresh_user().await.unwrap();

    assert_eq!(profile.id, UserId::new("42"));
    assert_eq!(profile.name.as_deref(), Some("Ann"));
    assert_eq!(fx.client.current_user(), Some(profile.clone()));
    assert_eq!(fx.client.current_user_id(), Some(UserId::new("42")));
    assert_eq!(fx.events.events(), vec![BusEvent::User(Some(profile))]);
}

#[tokio::test]
async fn test_refresh_user_error_keeps_previous_profile() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_get", Ok(json!({"id": 1})));
    fx.transport.respond("user_get", Err(RpcError::application(401, "expired")));
    fx.client.refresh_user().await.unwrap();

    assert!(fx.client.refresh_user().await.is_err());

    assert_eq!(fx.client.current_user_id(), Some(UserId::new("1")));
    assert_eq!(fx.events.events().len(), 1);
}

#[tokio::test]
async fn test_refresh_user_rejects_undecodable_profile() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_get", Ok(json!("not a user")));

    let err = fx.client.refresh_user().await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse { ref operation, .. } if operation == "user_get"));
    assert_eq!(fx.client.current_user(), None);
    assert!(fx.events.events().is_empty());
}

#[tokio::test]
async fn test_resume_without_credential_does_nothing() {
    let fx = make_client(None);

    assert_eq!(fx.client.resume().await.unwrap(), None);
    assert!(fx.transport.calls().is_empty());
}

#[tokio::test]
async fn test_resume_with_stored_credential_refreshes_user() {
    let fx = make_client(Some("abc"));
    fx.transport.respond("user_get", Ok(json!({"id": "u-9"})));

    let profile = fx.client.resume().await.unwrap().unwrap();

    assert_eq!(profile.id, UserId::new("u-9"));
    assert_eq!(fx.transport.operations(), vec!["user_get"]);
}

#[tokio::test]
async fn test_generate_id_uses_user_and_clock() {
    let fx = make_client(Some("abc"));

    let anonymous = fx.client.generate_id();
    assert!(anonymous.starts_with("null-1700000000000-"));

    fx.transport.respond("user_get", Ok(json!({"id": 42})));
    fx.client.refresh_user().await.unwrap();

    let id = fx.client.generate_id();
    let parts: Vec<&str> = id.splitn(3, '-').collect();
    assert_eq!(parts[0], "42");
    assert_eq!(parts[1], "1700000000000");
    let nonce: u32 = parts[2].parse().unwrap();
    assert!((1..=wb_core::id::NONCE_MAX).contains(&nonce));
}

#[tokio::test]
async fn test_credential_persists_across_clients_with_file_store() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::new();
    transport.respond("user_login", Ok(json!({"apikey": "K1"})));

    let first = CredentialedClient::builder()
        .transport(transport.clone())
        .store(Arc::new(FileStore::open(dir.path(), "wobble").unwrap()))
        .build()
        .unwrap();
    first.login("a@b.com", "pw").await.unwrap();
    drop(first);

    let second = CredentialedClient::builder()
        .transport(transport)
        .store(Arc::new(FileStore::open(dir.path(), "wobble").unwrap()))
        .build()
        .unwrap();

    assert_eq!(second.credential().as_deref(), Some("K1"));
}

#[tokio::test]
async fn test_config_scope_opens_file_store_in_store_dir() {
    let dir = tempdir().unwrap();
    let config = ClientConfig { store_scope: "app".to_string(), ..ClientConfig::default() };
    let transport = MockTransport::new();
    transport.respond("user_login", Ok(json!({"apikey": "K2"})));

    let first = CredentialedClient::builder()
        .transport(transport.clone())
        .config(&config)
        .store_dir(dir.path())
        .build()
        .unwrap();
    first.login("a@b.com", "pw").await.unwrap();
    drop(first);

    assert!(dir.path().join("app.json").exists());
    let second = CredentialedClient::builder()
        .transport(transport)
        .config(&config)
        .store_dir(dir.path())
        .build()
        .unwrap();
    assert_eq!(second.credential().as_deref(), Some("K2"));
}

#[test]
fn test_config_with_invalid_scope_fails_to_build() {
    let dir = tempdir().unwrap();
    let config = ClientConfig { store_scope: "Bad Scope".to_string(), ..ClientConfig::default() };

    let result = CredentialedClient::builder()
        .transport(MockTransport::new())
        .config(&config)
        .store_dir(dir.path())
        .build();

    assert!(matches!(result, Err(ClientError::Store(wb_core::Error::InvalidScope(_)))));
}

#[tokio::test]
async fn test_queued_call_keeps_credential_it_was_submitted_with() {
    let fx = make_guard();
    let store = Arc::new(MemoryStore::new());
    store.set(KEY, "before").unwrap();
    let client = CredentialedClient::builder()
        .transport(fx.guard.clone())
        .store(store)
        .build()
        .unwrap();

    fx.guard.transition_offline();
    let queued = client.call("post_delete", Params::new().with("post_id", "p1"));
    fx.transport.respond("user_signout", Ok(Value::Null));

    // Sign-out does not purge the queue; the guard is offline so sign out
    // must wait for the replay as well.
    let sign_out = client.sign_out();
    tokio::pin!(sign_out);
    assert!(still_pending(&mut sign_out).await);

    fx.scheduler.run_next().await;
    queued.await.unwrap();
    sign_out.await.unwrap();

    let calls = fx.transport.calls();
    assert_eq!(
        fx.transport.operations(),
        vec!["wobble.api_version", "post_delete", "user_signout"]
    );
    assert_eq!(sent_apikey(&calls[1]).as_deref(), Some("before"));
    assert_eq!(client.credential(), None);
}

/// Poll a future once; true when it is still pending.
async fn still_pending<F: std::future::Future + Unpin>(future: &mut F) -> bool {
    tokio::select! {
        biased;
        _ = future => false,
        _ = std::future::ready(()) => true,
    }
}
