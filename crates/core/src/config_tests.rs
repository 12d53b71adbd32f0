// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::tempdir;
use yare::parameterized;

#[test]
fn empty_config_uses_defaults() {
    let config = ClientConfig::from_toml("").unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.credential_key, "WOBBLEAPI_APIKEY");
    assert_eq!(config.reconnect.base_delay_ms, 100);
    assert_eq!(config.reconnect.backoff_step_ms, 500);
    assert_eq!(config.reconnect.max_retry_steps, 10);
    assert_eq!(config.reconnect.probe_operation, "wobble.api_version");
}

#[test]
fn partial_reconnect_section_keeps_other_defaults() {
    let config = ClientConfig::from_toml(
        r#"
[reconnect]
backoff_step_ms = 250
"#,
    )
    .unwrap();

    assert_eq!(config.reconnect.backoff_step_ms, 250);
    assert_eq!(config.reconnect.base_delay_ms, 100);
    assert_eq!(config.store_scope, "wobble");
}

#[test]
fn max_delay_is_base_plus_capped_steps() {
    let reconnect = ReconnectConfig::default();
    assert_eq!(reconnect.max_delay(), Duration::from_millis(100 + 10 * 500));
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("client.toml");

    let mut config = ClientConfig::default();
    config.credential_key = "TOKEN".to_string();
    config.reconnect.max_retry_steps = 3;
    config.save(&path).unwrap();

    let loaded = ClientConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn load_or_default_without_file() {
    let dir = tempdir().unwrap();
    let config = ClientConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn load_missing_file_is_config_error() {
    let dir = tempdir().unwrap();
    let err = ClientConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[parameterized(
    bad_syntax = { "credential_key = " },
    wrong_type = { "[reconnect]\nbase_delay_ms = \"soon\"" },
    empty_key = { "credential_key = \"\"" },
    empty_probe = { "[reconnect]\nprobe_operation = \" \"" },
)]
fn invalid_config_is_rejected(content: &str) {
    let err = ClientConfig::from_toml(content).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn invalid_scope_is_rejected() {
    let err = ClientConfig::from_toml("store_scope = \"../x\"").unwrap_err();
    assert!(matches!(err, Error::InvalidScope(_)));
}

#[test]
fn default_store_dir_ends_with_app_name() {
    if std::env::var("WOBBLE_STATE_DIR").is_ok() {
        return;
    }
    let dir = default_store_dir();
    assert!(dir.ends_with("wobble") || dir.ends_with(".wobble"));
}
