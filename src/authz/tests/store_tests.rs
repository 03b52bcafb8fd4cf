//! Token catalog loading and lookup tests

use chrono::{TimeZone, Utc};
use ingress_authz::{
    error::{AuthzError, ConfigError},
    store::{MemoryTokenStore, TokenStore},
    types::StaticToken,
};
use regex::Regex;
use std::io::Write;
use tempfile::NamedTempFile;

const GOOD_JSON_CONFIG: &str = r#"
{
    "version": "v1",
    "tokens": [
        {
            "value": "t0",
            "client_id": "c0"
        },
        {
            "value": "t1",
            "client_id": "c1",
            "disable": true,
            "expires_at": "2022-07-04T14:21:22.52Z",
            "allowed_url": "https://custom.host.dev/.*",
            "allowed_method": "(GET|POST)"
        },
        {
            "value": "t2",
            "allowed_method": "PUT"
        }
    ]
}
"#;

const GOOD_YAML_CONFIG: &str = r#"
version: v1
tokens:
- value: t0
  client_id: c0

- value: t1
  client_id: c1
  disable: true
  expires_at: 2022-07-04T14:21:22.52Z
  allowed_url: https://custom.host.dev/.*
  allowed_method: (GET|POST)

- value: t2
  allowed_method: PUT
"#;

fn pattern(re: &Option<Regex>) -> Option<&str> {
    re.as_ref().map(Regex::as_str)
}

fn assert_full_token(token: &StaticToken) {
    let expires_at = Utc.with_ymd_and_hms(2022, 7, 4, 14, 21, 22).unwrap()
        + chrono::Duration::milliseconds(520);

    assert_eq!(token.value, "t1");
    assert_eq!(token.client_id, "c1");
    assert!(token.disabled);
    assert_eq!(token.expires_at, Some(expires_at));
    assert_eq!(pattern(&token.allowed_url), Some("https://custom.host.dev/.*"));
    assert_eq!(pattern(&token.allowed_method), Some("(GET|POST)"));
}

// ============================================================================
// LOOKUPS
// ============================================================================

#[test]
fn test_missing_token_is_not_found() {
    let store = MemoryTokenStore::new(GOOD_JSON_CONFIG).unwrap();

    let err = store.get_token("t3").unwrap_err();
    assert!(matches!(err, AuthzError::NotFound));
}

#[test]
fn test_basic_token() {
    let store = MemoryTokenStore::new(GOOD_JSON_CONFIG).unwrap();

    let token = store.get_token("t0").unwrap();
    assert_eq!(token.value, "t0");
    assert_eq!(token.client_id, "c0");
    assert!(!token.disabled);
    assert!(token.expires_at.is_none());
    assert!(token.allowed_method.is_none());
    assert!(token.allowed_url.is_none());
}

#[test]
fn test_full_token_json() {
    let store = MemoryTokenStore::new(GOOD_JSON_CONFIG).unwrap();

    assert_eq!(store.len(), 3);
    assert_full_token(&store.get_token("t1").unwrap());
}

#[test]
fn test_full_token_yaml() {
    let store = MemoryTokenStore::new(GOOD_YAML_CONFIG).unwrap();

    assert_eq!(store.len(), 3);
    assert_full_token(&store.get_token("t1").unwrap());
    assert_eq!(pattern(&store.get_token("t2").unwrap().allowed_method), Some("PUT"));
}

#[test]
fn test_lookup_does_not_mutate_store() {
    let store = MemoryTokenStore::new(GOOD_JSON_CONFIG).unwrap();

    for _ in 0..3 {
        store.get_token("t0").unwrap();
        store.get_token("nope").unwrap_err();
    }

    assert_eq!(store.len(), 3);
}

// ============================================================================
// ENVIRONMENT SUBSTITUTION
// ============================================================================

#[test]
fn test_token_from_env_json() {
    std::env::set_var("INGRESS_AUTHZ_TEST_TOKEN_JSON", "1234567890");

    let store = MemoryTokenStore::new(
        r#"
        {
            "version": "v1",
            "tokens": [
                {
                    "value": "${INGRESS_AUTHZ_TEST_TOKEN_JSON}"
                }
            ]
        }
        "#,
    )
    .unwrap();

    let token = store.get_token("1234567890").unwrap();
    assert_eq!(token.value, "1234567890");
    assert!(token.client_id.is_empty());
}

#[test]
fn test_token_from_env_yaml() {
    std::env::set_var("INGRESS_AUTHZ_TEST_TOKEN_YAML", "1234567890");

    let store = MemoryTokenStore::new(
        r#"
version: v1
tokens:
- value: ${INGRESS_AUTHZ_TEST_TOKEN_YAML}
"#,
    )
    .unwrap();

    assert_eq!(store.get_token("1234567890").unwrap().value, "1234567890");
}

#[test]
fn test_unset_env_token_is_empty_value() {
    let err = MemoryTokenStore::new(
        r#"{"version": "v1", "tokens": [{"value": "${INGRESS_AUTHZ_TEST_TOKEN_NEVER_SET}"}]}"#,
    )
    .unwrap_err();

    assert!(matches!(err, AuthzError::Config(ConfigError::EmptyTokenValue { index: 0 })));
}

#[test]
fn test_unset_env_token_takes_default() {
    let store = MemoryTokenStore::new(
        r#"
version: v1
tokens:
- value: ${INGRESS_AUTHZ_TEST_TOKEN_UNSET:-fallback}
  client_id: ${INGRESS_AUTHZ_TEST_CLIENT_UNSET:-dev}
"#,
    )
    .unwrap();

    let token = store.get_token("fallback").unwrap();
    assert_eq!(token.client_id, "dev");
}

// ============================================================================
// FAIL-CLOSED LOADING
// ============================================================================

#[test]
fn test_duplicate_tokens_fail() {
    let err = MemoryTokenStore::new(
        r#"
version: v1
tokens:
- value: dup
  client_id: first
- value: dup
  client_id: second
"#,
    )
    .unwrap_err();

    assert!(matches!(err, AuthzError::Config(ConfigError::DuplicateToken { .. })));
}

#[test]
fn test_duplicate_disabled_token_fails() {
    let err = MemoryTokenStore::new(
        r#"{"version": "v1", "tokens": [{"value": "dup", "disable": true}, {"value": "dup"}]}"#,
    )
    .unwrap_err();

    assert!(matches!(err, AuthzError::Config(ConfigError::DuplicateToken { .. })));
}

#[test]
fn test_invalid_method_regex_fails() {
    let err = MemoryTokenStore::new(r#"{"version": "v1", "tokens": [{"value": "t0", "allowed_method": "[GET"}]}"#)
        .unwrap_err();

    assert!(err.to_string().contains("[GET"));
}

#[test]
fn test_unsupported_version_fails() {
    let err = MemoryTokenStore::new("version: v2\ntokens:\n- value: t0\n").unwrap_err();

    assert!(matches!(
        err,
        AuthzError::Config(ConfigError::UnsupportedVersion { ref got, .. }) if got == "v2"
    ));
}

#[test]
fn test_garbage_document_fails() {
    let err = MemoryTokenStore::new("{{{ not a catalog").unwrap_err();

    assert!(matches!(err, AuthzError::Config(ConfigError::Parse { .. })));
}

#[test]
fn test_invalid_expiry_fails() {
    let err = MemoryTokenStore::new(r#"{"version": "v1", "tokens": [{"value": "t0", "expires_at": "tomorrow"}]}"#)
        .unwrap_err();

    assert!(matches!(err, AuthzError::Config(ConfigError::Parse { .. })));
}

// ============================================================================
// FILE SOURCE
// ============================================================================

#[test]
fn test_store_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(GOOD_YAML_CONFIG.as_bytes()).unwrap();

    let store = MemoryTokenStore::from_file(file.path()).unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.get_token("t0").unwrap().client_id, "c0");
}
