//! Shared mock platform for the integration tests.
//!
//! One `MockServer` stands in for all three service roots, which are
//! mounted under `/ifas/jlr`, `/ifop/jlr` and `/if9/jlr`.

#![allow(dead_code)]

use std::sync::Arc;

use jlr_incontrol::{
    AuthSession, BaseUrl, Credentials, DeviceId, Email, InControlConfig, Password, Vin,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const EMAIL: &str = "driver@example.com";
pub const DEVICE_ID: &str = "0b8a4c1e-7f0e-4a59-9d51-2f6b3c4d5e6f";
pub const USER_ID: &str = "user-42";
pub const VIN: &str = "SAJAA1234AB567890";

/// Builds a configuration pointing every root at `server`.
pub fn config(server: &MockServer) -> InControlConfig {
    InControlConfig::builder()
        .ifas_base_url(BaseUrl::new(format!("{}/ifas/jlr", server.uri())).unwrap())
        .ifop_base_url(BaseUrl::new(format!("{}/ifop/jlr", server.uri())).unwrap())
        .if9_base_url(BaseUrl::new(format!("{}/if9/jlr", server.uri())).unwrap())
        .build()
        .unwrap()
}

pub fn credentials() -> Credentials {
    Credentials::with_password(Email::new(EMAIL).unwrap(), Password::new("hunter2").unwrap())
        .device_id(DeviceId::new(DEVICE_ID).unwrap())
}

pub fn vin() -> Vin {
    Vin::new(VIN).unwrap()
}

/// Creates an unconnected session against `server`.
pub fn session(server: &MockServer) -> Arc<AuthSession> {
    Arc::new(AuthSession::new(config(server), credentials()).unwrap())
}

fn token_body(access_token: &str, refresh_token: &str, expires_in: &str) -> serde_json::Value {
    json!({
        "access_token": access_token,
        "authorization_token": format!("authz-{access_token}"),
        "refresh_token": refresh_token,
        "expires_in": expires_in,
        "token_type": "bearer"
    })
}

/// Mounts the password grant.
pub async fn mount_password_grant(server: &MockServer, expires_in: &str) {
    Mock::given(method("POST"))
        .and(path("/ifas/jlr/tokens"))
        .and(body_partial_json(json!({"grant_type": "password"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-1", expires_in)),
        )
        .mount(server)
        .await;
}

/// Mounts the refresh grant for `refresh-1`, expected `expected` times.
pub async fn mount_refresh_grant(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/ifas/jlr/tokens"))
        .and(body_partial_json(
            json!({"grant_type": "refresh_token", "refresh_token": "refresh-1"}),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body("access-2", "refresh-2", "86400")),
        )
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts device registration and login.
pub async fn mount_registration_and_login(server: &MockServer) {
    mount_registration_and_login_with(server, None).await;
}

/// Mounts device registration and login, each expected `expected` times.
pub async fn mount_registration_and_login_expecting(server: &MockServer, expected: u64) {
    mount_registration_and_login_with(server, Some(expected)).await;
}

async fn mount_registration_and_login_with(server: &MockServer, expected: Option<u64>) {
    let mut registration = Mock::given(method("POST"))
        .and(path_regex(r"^/ifop/jlr/users/.+/clients$"))
        .respond_with(ResponseTemplate::new(204));
    let mut login = Mock::given(method("GET"))
        .and(path("/if9/jlr/users"))
        .and(query_param("loginName", EMAIL))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userId": USER_ID,
            "loginName": EMAIL
        })));

    if let Some(expected) = expected {
        registration = registration.expect(expected);
        login = login.expect(expected);
    }

    registration.mount(server).await;
    login.mount(server).await;
}

/// Mounts a full long-lived bootstrap.
pub async fn mount_bootstrap(server: &MockServer) {
    mount_password_grant(server, "86400").await;
    mount_registration_and_login(server).await;
}

/// Mounts a service token exchange for `service`, answering with `token`.
pub async fn mount_service_token(server: &MockServer, service: &str, token: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/if9/jlr/vehicles/{VIN}/users/{USER_ID}/authenticate")))
        .and(body_partial_json(json!({"serviceName": service})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .expect(expected)
        .mount(server)
        .await;
}

/// Path of a vehicle resource on the mock server.
pub fn vehicle_path(resource: &str) -> String {
    format!("/if9/jlr/vehicles/{VIN}/{resource}")
}
