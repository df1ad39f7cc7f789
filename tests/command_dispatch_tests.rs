//! Integration tests for vehicle reads and command dispatch.

mod common;

use common::*;
use jlr_incontrol::vehicle::media_types;
use jlr_incontrol::{
    Command, CommandError, Payload, Pin, ServiceAuthError, Vehicle, VehicleCommandDispatcher,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connected_dispatcher(server: &MockServer) -> VehicleCommandDispatcher {
    mount_bootstrap(server).await;
    let session = session(server);
    session.connect().await.unwrap();
    VehicleCommandDispatcher::new(session)
}

fn pin() -> Pin {
    Pin::new("1234").unwrap()
}

// ============================================================================
// Commands
// ============================================================================

#[tokio::test]
async fn test_lock_requests_token_then_posts_it() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/if9/jlr/vehicles/{VIN}/users/{USER_ID}/authenticate")))
        .and(body_json(json!({"serviceName": "RDL", "pin": "1234"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "rdl-token"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("lock")))
        .and(header(
            "content-type",
            media_types::START_SERVICE_CONFIGURATION_V2,
        ))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({"token": "rdl-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customerServiceId": "svc-1",
            "status": "Started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dispatcher = connected_dispatcher(&server).await;
    let response = assert_ok!(
        dispatcher
            .send(&vin(), Command::Lock, Some(&pin()), Payload::Empty)
            .await
    );

    assert_eq!(response.unwrap()["customerServiceId"], "svc-1");
}

#[tokio::test]
async fn test_every_command_gets_a_fresh_token() {
    let server = MockServer::start().await;
    mount_service_token(&server, "RDU", "rdu-token", 2).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("unlock")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Started"})))
        .expect(2)
        .mount(&server)
        .await;

    let dispatcher = connected_dispatcher(&server).await;
    let vehicle = Vehicle::new(dispatcher, vin());

    assert_ok!(vehicle.unlock(&pin()).await);
    assert_ok!(vehicle.unlock(&pin()).await);
}

#[tokio::test]
async fn test_rejected_token_blocks_command() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/if9/jlr/vehicles/{VIN}/users/{USER_ID}/authenticate")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(vehicle_path("lock")))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dispatcher = connected_dispatcher(&server).await;
    let error = assert_err!(
        dispatcher
            .send(&vin(), Command::Lock, Some(&pin()), Payload::Empty)
            .await
    );

    assert!(matches!(
        error,
        CommandError::ServiceAuth(ServiceAuthError::Rejected { status: 401, .. })
    ));
}

#[tokio::test]
async fn test_missing_pin_sends_nothing() {
    let server = MockServer::start().await;
    mount_service_token(&server, "REON", "t", 0).await;

    let dispatcher = connected_dispatcher(&server).await;
    let error = assert_err!(
        dispatcher
            .send(&vin(), Command::EngineOn, None, Payload::Empty)
            .await
    );

    assert!(matches!(
        error,
        CommandError::ServiceAuth(ServiceAuthError::PinRequired { .. })
    ));
}

#[tokio::test]
async fn test_empty_command_response_is_none() {
    let server = MockServer::start().await;
    mount_service_token(&server, "HBLF", "hblf-token", 1).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("honkBlink")))
        .and(header("accept", media_types::SERVICE_STATUS_V4))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    let response = assert_ok!(vehicle.honk_blink().await);
    assert!(response.is_none());
}

#[tokio::test]
async fn test_forbidden_command_is_unauthorized() {
    let server = MockServer::start().await;
    mount_service_token(&server, "VHS", "vhs-token", 1).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("healthstatus")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errorLabel": "Forbidden",
            "errorDescription": "Subscription expired"
        })))
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    let error = assert_err!(vehicle.health_status().await);

    assert!(matches!(
        error,
        CommandError::Unauthorized { status: 403, .. }
    ));
}

#[tokio::test]
async fn test_charge_profile_wraps_parameters_under_key() {
    let server = MockServer::start().await;
    mount_service_token(&server, "CP", "cp-token", 1).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("chargeProfile")))
        .and(header("content-type", media_types::PHEV_SERVICE_V1))
        .and(body_json(json!({
            "token": "cp-token",
            "serviceParameters": [{"key": "SET_PERMANENT_MAX_SOC", "value": 80}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Started"})))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    assert_ok!(vehicle.set_max_soc(80).await);
}

#[tokio::test]
async fn test_preconditioning_merges_parameters_at_top_level() {
    let server = MockServer::start().await;
    mount_service_token(&server, "ECC", "ecc-token", 1).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("preconditioning")))
        .and(body_json(json!({
            "token": "ecc-token",
            "serviceParameters": [
                {"key": "PRECONDITIONING", "value": "START"},
                {"key": "TARGET_TEMPERATURE_CELSIUS", "value": "21"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Started"})))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    assert_ok!(vehicle.preconditioning_start(21.0).await);
}

#[tokio::test]
async fn test_invalid_soc_is_rejected_before_sending() {
    let server = MockServer::start().await;
    mount_service_token(&server, "CP", "cp-token", 0).await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    let error = assert_err!(vehicle.set_max_soc(101).await);

    assert!(matches!(error, CommandError::InvalidParameter { .. }));
}

#[tokio::test]
async fn test_expired_session_refreshes_once_per_command() {
    let server = MockServer::start().await;
    mount_password_grant(&server, "0").await;
    mount_refresh_grant(&server, 1).await;
    mount_registration_and_login(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("/if9/jlr/vehicles/{VIN}/users/{USER_ID}/authenticate")))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "rdl-token"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(vehicle_path("lock")))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Started"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = session(&server);
    session.connect().await.unwrap();
    let vehicle = Vehicle::new(VehicleCommandDispatcher::new(session), vin());

    assert_ok!(vehicle.lock(&pin()).await);
}

#[tokio::test]
async fn test_provisioning_mode_body() {
    let server = MockServer::start().await;
    mount_service_token(&server, "PROV", "prov-token", 1).await;

    Mock::given(method("POST"))
        .and(path(vehicle_path("prov")))
        .and(body_partial_json(json!({
            "token": "prov-token",
            "serviceCommand": "privacySwitch_on",
            "startTime": null,
            "endTime": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Started"})))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    assert_ok!(vehicle.enable_privacy_mode(&pin()).await);
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn test_reads_never_request_service_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/if9/jlr/vehicles/{VIN}/users/{USER_ID}/authenticate")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vehicle_path("status")))
        .and(header("accept", media_types::HEALTH_STATUS_V2))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vehicleStatus": {
                "coreStatus": [{"key": "DOOR_IS_ALL_DOORS_LOCKED", "value": "TRUE"}],
                "evStatus": [{"key": "EV_STATE_OF_CHARGE", "value": "76"}]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(vehicle_path("position")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "position": {"latitude": 51.5, "longitude": -0.12}
        })))
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());

    let soc = assert_ok!(vehicle.status_value("EV_STATE_OF_CHARGE").await);
    assert_eq!(soc, Some(json!("76")));

    let position = assert_ok!(vehicle.position().await).unwrap();
    assert_eq!(position["position"]["latitude"], 51.5);
}

#[tokio::test]
async fn test_trips_pass_count_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(vehicle_path("trips")))
        .and(query_param("count", "25"))
        .and(header("accept", media_types::TRIP_LIST_V2))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"trips": []})))
        .expect(1)
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    let trips = assert_ok!(vehicle.trips(25).await).unwrap();
    assert_eq!(trips["trips"], json!([]));
}

#[tokio::test]
async fn test_read_failure_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(vehicle_path("attributes")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errorLabel": "InternalError"
        })))
        .mount(&server)
        .await;

    let vehicle = Vehicle::new(connected_dispatcher(&server).await, vin());
    let error = assert_err!(vehicle.attributes().await);

    assert!(matches!(error, CommandError::Transport(_)));
}
