//! Integration tests for the session bootstrap and refresh cycle.

mod common;

use std::sync::Arc;

use common::*;
use jlr_incontrol::vehicle::media_types;
use jlr_incontrol::{AuthError, AuthSession, Credentials, Email, Password};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn test_connect_sends_password_grant_with_client_headers() {
    let server = MockServer::start().await;
    let config = config(&server);

    Mock::given(method("POST"))
        .and(path("/ifas/jlr/tokens"))
        .and(header("authorization", config.basic_authorization().as_str()))
        .and(header("x-device-id", DEVICE_ID))
        .and(header("connection", "close"))
        .and(body_partial_json(json!({
            "grant_type": "password",
            "username": EMAIL,
            "password": "hunter2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "authorization_token": "authz-access-1",
            "refresh_token": "refresh-1",
            "expires_in": "86400"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_registration_and_login(&server).await;

    let session = AuthSession::new(config, credentials()).unwrap();
    let active = assert_ok!(session.connect().await);

    assert_eq!(active.user().user_id(), USER_ID);
    assert_eq!(
        active.headers().get("authorization"),
        Some("Bearer access-1")
    );
    assert_eq!(active.headers().get("x-device-id"), Some(DEVICE_ID));
    assert!(session.is_authenticated().await);
}

#[tokio::test]
async fn test_connect_registers_device_with_new_tokens() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "86400").await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/ifop/jlr/users/.+/clients$"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("x-device-id", DEVICE_ID))
        .and(body_partial_json(json!({
            "access_token": "access-1",
            "authorization_token": "authz-access-1",
            "expires_in": "86400",
            "deviceID": DEVICE_ID
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/if9/jlr/users"))
        .and(header("accept", media_types::USER_V3))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userId": USER_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server);
    assert_ok!(session.connect().await);
}

#[tokio::test]
async fn test_rejected_password_leaves_session_unauthenticated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/ifas/jlr/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad credentials"
        })))
        .mount(&server)
        .await;

    let session = session(&server);
    let error = assert_err!(session.connect().await);

    assert!(matches!(
        error,
        AuthError::Rejected {
            endpoint: "tokens",
            status: 401,
            ..
        }
    ));
    assert!(!session.is_authenticated().await);
    assert!(matches!(
        session.ensure_valid().await,
        Err(AuthError::NotConnected)
    ));
}

#[tokio::test]
async fn test_registration_failure_fails_connect() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "86400").await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/ifop/jlr/users/.+/clients$"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = session(&server);
    let error = assert_err!(session.connect().await);

    assert!(matches!(
        error,
        AuthError::Rejected {
            endpoint: "clients",
            status: 500,
            ..
        }
    ));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_login_without_user_id_is_malformed() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "86400").await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/ifop/jlr/users/.+/clients$"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/if9/jlr/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"loginName": EMAIL})))
        .mount(&server)
        .await;

    let session = session(&server);
    let error = assert_err!(session.connect().await);

    assert!(matches!(
        error,
        AuthError::MalformedResponse {
            endpoint: "users",
            ..
        }
    ));
}

#[tokio::test]
async fn test_ensure_valid_before_connect_is_not_connected() {
    let server = MockServer::start().await;
    let session = session(&server);

    assert!(matches!(
        session.ensure_valid().await,
        Err(AuthError::NotConnected)
    ));
    assert!(session.current_refresh_token().await.is_none());
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_valid_session_is_not_refreshed() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    mount_refresh_grant(&server, 0).await;

    let session = session(&server);
    session.connect().await.unwrap();

    let first = session.ensure_valid().await.unwrap();
    let second = session.ensure_valid().await.unwrap();
    assert_eq!(first.headers(), second.headers());
}

#[tokio::test]
async fn test_expired_session_refreshes_exactly_once() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "0").await;
    mount_refresh_grant(&server, 1).await;
    mount_registration_and_login_expecting(&server, 2).await;

    let session = session(&server);
    session.connect().await.unwrap();

    let refreshed = session.ensure_valid().await.unwrap();
    assert_eq!(
        refreshed.headers().get("authorization"),
        Some("Bearer access-2")
    );

    // The refreshed token lives for a day, so this does not refresh again
    let again = session.ensure_valid().await.unwrap();
    assert_eq!(again.headers(), refreshed.headers());
    assert_eq!(
        session.current_refresh_token().await.as_deref(),
        Some("refresh-2")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "0").await;
    mount_refresh_grant(&server, 1).await;
    mount_registration_and_login_expecting(&server, 2).await;

    let session = session(&server);
    session.connect().await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.ensure_valid().await })
        })
        .collect();

    for task in tasks {
        let active = task.await.unwrap().unwrap();
        assert_eq!(
            active.headers().get("authorization"),
            Some("Bearer access-2")
        );
    }
}

#[tokio::test]
async fn test_failed_refresh_drops_authentication() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "0").await;
    mount_registration_and_login(&server).await;

    Mock::given(method("POST"))
        .and(path("/ifas/jlr/tokens"))
        .and(body_partial_json(json!({"grant_type": "refresh_token"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let session = session(&server);
    session.connect().await.unwrap();

    let error = assert_err!(session.ensure_valid().await);
    assert!(matches!(error, AuthError::Rejected { status: 400, .. }));
    assert!(!session.is_authenticated().await);
}

#[tokio::test]
async fn test_forced_refresh_keeps_device_id() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    mount_refresh_grant(&server, 1).await;

    let session = session(&server);
    let before = session.connect().await.unwrap();
    let after = session.refresh().await.unwrap();

    assert_eq!(
        before.headers().get("x-device-id"),
        after.headers().get("x-device-id")
    );
    assert_eq!(session.device_id().as_ref(), DEVICE_ID);
}

#[tokio::test]
async fn test_connect_with_refresh_token_grant() {
    let server = MockServer::start().await;
    mount_refresh_grant(&server, 1).await;
    mount_registration_and_login(&server).await;

    let credentials =
        Credentials::with_refresh_token(Email::new(EMAIL).unwrap(), "refresh-1").unwrap();
    let session = AuthSession::new(config(&server), credentials).unwrap();

    let active = assert_ok!(session.connect().await);
    assert_eq!(
        active.headers().get("authorization"),
        Some("Bearer access-2")
    );
    assert_eq!(
        session.current_refresh_token().await.as_deref(),
        Some("refresh-2")
    );
}

#[tokio::test]
async fn test_generated_device_id_is_reused_for_every_registration() {
    let server = MockServer::start().await;
    mount_bootstrap(&server).await;
    mount_refresh_grant(&server, 1).await;

    let credentials =
        Credentials::with_password(Email::new(EMAIL).unwrap(), Password::new("hunter2").unwrap());
    let generated = credentials.device().as_ref().to_string();
    let session = AuthSession::new(config(&server), credentials).unwrap();

    session.connect().await.unwrap();
    session.refresh().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let registrations: Vec<_> = requests
        .iter()
        .filter(|request| request.url.path().ends_with("/clients"))
        .collect();
    assert_eq!(registrations.len(), 2);

    for request in registrations {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["deviceID"], generated.as_str());
    }
    assert_eq!(session.device_id().as_ref(), generated);
}

#[tokio::test]
async fn test_unrepresentable_token_lifetime_is_malformed() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "10000000000000").await;

    let session = session(&server);
    let error = assert_err!(session.connect().await);

    assert!(matches!(
        error,
        AuthError::MalformedResponse {
            endpoint: "tokens",
            ..
        }
    ));
    assert!(!session.is_authenticated().await);
}
