//! Wire-level integration tests for the refresh protocol.
//!
//! Runs the real reqwest transport against a mock school server and the full
//! vault/session stack on the in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bakasync_core::{CredentialSession, CredentialVault, RefreshLockRegistry};
use bakasync_domain::{BakasyncError, Credential, HttpSettings};
use bakasync_infra::{BakalariClient, MemoryStore};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IDENTITY: &str = "https://school.example.cz+jan.novak";
const SECRET: &str = "hunter2";

fn token_body(suffix: &str) -> serde_json::Value {
    json!({
        "access_token": format!("access-{suffix}"),
        "refresh_token": format!("refresh-{suffix}"),
        "expires_in": 3600,
        "token_type": "Bearer"
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn session_against(
    server: &MockServer,
    refresh_token: &str,
    expires_offset_ms: i64,
) -> CredentialSession {
    init_tracing();
    let vault = Arc::new(CredentialVault::new(Arc::new(MemoryStore::new())));
    let client = BakalariClient::new(&HttpSettings::default()).unwrap();

    let credential = Credential {
        endpoint_url: server.uri(),
        access_token: "stale-access".to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at_epoch_ms: chrono::Utc::now().timestamp_millis() + expires_offset_ms,
    };

    let (session, already_existed) = CredentialSession::create(
        vault,
        Arc::new(client),
        Arc::new(RefreshLockRegistry::new()),
        IDENTITY,
        credential,
        SECRET,
    )
    .await
    .unwrap();
    assert!(!already_existed);
    session
}

/// Validates the refresh request wire contract.
///
/// Assertions:
/// - Confirms the form body carries `client_id=ANDR`, the grant type, and
///   the urlencoded refresh token.
/// - Confirms the rotated tokens land in the session.
#[tokio::test]
async fn refresh_sends_expected_form_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_string_contains("client_id=ANDR"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=tajny%2Frefresh+token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("v2")))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_against(&server, "tajny/refresh token", -1000).await;
    session.ensure_fresh().await.unwrap();

    assert_eq!(session.access_token().await, "access-v2");
    assert_eq!(session.credential().await.refresh_token, "refresh-v2");
}

/// Validates the one-shot retry on a transient 401.
///
/// Assertions:
/// - Confirms exactly two wire requests with identical bodies.
/// - Confirms the credential reflects the second response.
#[tokio::test]
async fn unauthorized_once_is_retried_once() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(401)
            } else {
                ResponseTemplate::new(200).set_body_json(token_body("retried"))
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let session = session_against(&server, "stale-refresh", -1000).await;
    session.ensure_fresh().await.unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(session.access_token().await, "access-retried");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
    assert_eq!(requests[0].headers, requests[1].headers);
}

/// Validates the persistent rejection path.
///
/// Assertions:
/// - Ensures two 401s end in `AuthenticationFailure` carrying the server's
///   description, with no third request.
#[tokio::test]
async fn second_unauthorized_fails_with_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token has been revoked"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let session = session_against(&server, "revoked-refresh", -1000).await;
    let err = session.ensure_fresh().await.unwrap_err();

    assert!(matches!(err, BakasyncError::AuthenticationFailure(_)));
    assert!(err.to_string().contains("Refresh token has been revoked"));
}

/// Validates the body-level error path.
///
/// Assertions:
/// - Ensures an `error` field in a 200 response still fails the refresh (the
///   server's word beats the status line).
#[tokio::test]
async fn error_field_in_success_status_still_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_request",
            "error_description": "Missing refresh token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_against(&server, "stale-refresh", -1000).await;
    let err = session.ensure_fresh().await.unwrap_err();

    assert!(matches!(err, BakasyncError::AuthenticationFailure(_)));
    assert!(err.to_string().contains("Missing refresh token"));
}

/// Validates the fresh-token fast path.
///
/// Assertions:
/// - Ensures no wire request happens while the token is outside the margin.
#[tokio::test]
async fn fresh_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ResponseTemplate::new(500)).expect(0).mount(&server).await;

    let session = session_against(&server, "fresh-refresh", 10 * 60 * 1000).await;
    session.ensure_fresh().await.unwrap();

    assert_eq!(session.access_token().await, "stale-access");
}
