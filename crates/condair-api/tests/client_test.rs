// Integration tests for `CondairClient` using wiremock.
#![allow(clippy::unwrap_used)]

use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use condair_api::{CondairClient, DatapointSnapshot, Error, ParentGroup, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CondairClient) {
    let server = MockServer::start().await;
    let client = CondairClient::with_client(Url::parse(&server.uri()).unwrap(), reqwest::Client::new());
    (server, client)
}

fn password() -> SecretString {
    SecretString::from("hunter2".to_owned())
}

fn token_body(access: &str, refresh: &str, expires_in: serde_json::Value) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "expires_in": expires_in,
    })
}

async fn mount_sign_in(server: &MockServer, expires_in: serde_json::Value, times: u64) {
    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .and(body_json(json!({"username": "user@example.com", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-1", "refresh-1", expires_in)))
        .expect(times)
        .mount(server)
        .await;
}

/// Authenticated client whose token is good for an hour.
async fn signed_in() -> (MockServer, CondairClient) {
    let (server, mut client) = setup().await;
    mount_sign_in(&server, json!(3600), 1).await;
    client.authenticate("user@example.com", &password()).await.unwrap();
    (server, client)
}

async fn mount_actions(server: &MockServer, device_id: &str, actions: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/condair/sensor-instances/{device_id}/actions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(actions))
        .mount(server)
        .await;
}

// ── Token lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_sets_expiry_with_margin() {
    let (server, mut client) = setup().await;
    mount_sign_in(&server, json!(3600), 1).await;

    let before = Utc::now();
    client.authenticate("user@example.com", &password()).await.unwrap();
    let after = Utc::now();

    let expires_at = client.expires_at().unwrap();
    assert!(client.is_authenticated());
    assert!(expires_at >= before + TimeDelta::seconds(3570));
    assert!(expires_at <= after + TimeDelta::seconds(3570));
}

#[tokio::test]
async fn test_authenticate_accepts_string_lifetime() {
    let (server, mut client) = setup().await;
    mount_sign_in(&server, json!("600"), 1).await;

    let before = Utc::now();
    client.authenticate("user@example.com", &password()).await.unwrap();
    let after = Utc::now();

    let expires_at = client.expires_at().unwrap();
    assert!(expires_at >= before + TimeDelta::seconds(570));
    assert!(expires_at <= after + TimeDelta::seconds(570));
}

#[tokio::test]
async fn test_authenticate_defaults_lifetime() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a",
            "refresh_token": "r"
        })))
        .mount(&server)
        .await;

    let before = Utc::now();
    client.authenticate("user@example.com", &password()).await.unwrap();

    assert!(client.expires_at().unwrap() >= before + TimeDelta::seconds(3570));
}

#[tokio::test]
async fn test_authenticate_error_field() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Wrong password"
        })))
        .mount(&server)
        .await;

    let result = client.authenticate("user@example.com", &password()).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "invalid_grant - Wrong password");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_missing_refresh_token() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "a"})))
        .mount(&server)
        .await;

    let result = client.authenticate("user@example.com", &password()).await;

    assert!(
        matches!(result, Err(Error::MalformedTokenResponse { .. })),
        "expected MalformedTokenResponse, got: {result:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_array_reply_is_malformed() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["tok", "ref"])))
        .mount(&server)
        .await;

    let result = client.authenticate("user@example.com", &password()).await;

    assert!(
        matches!(result, Err(Error::MalformedTokenResponse { .. })),
        "expected MalformedTokenResponse, got: {result:?}"
    );
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_http_500() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
        .mount(&server)
        .await;

    let result = client.authenticate("user@example.com", &password()).await;

    match result {
        Err(Error::HttpStatus { status, ref body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "gateway exploded");
        }
        other => panic!("expected HttpStatus error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_ensure_valid_without_authentication() {
    let (_server, mut client) = setup().await;

    let result = client.ensure_valid().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)));

    let result = client.list_devices().await;
    assert!(matches!(result, Err(Error::NotAuthenticated)));
}

#[tokio::test]
async fn test_ensure_valid_fresh_token_makes_no_request() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("x", "y", json!(3600))))
        .expect(0)
        .mount(&server)
        .await;

    client.ensure_valid().await.unwrap();
    client.ensure_valid().await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_refreshed_before_request() {
    let (server, mut client) = setup().await;
    // A zero lifetime leaves the token already inside the expiry margin.
    mount_sign_in(&server, json!(0), 1).await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("access-2", "refresh-2", json!(3600))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .and(query_param("pageSize", "999"))
        .and(header("Authorization", "Bearer access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate("user@example.com", &password()).await.unwrap();
    assert!(client.expires_at().unwrap() <= Utc::now());

    let devices = client.list_devices().await.unwrap();
    assert!(devices.is_empty());
    assert!(client.expires_at().unwrap() > Utc::now());
}

#[tokio::test]
async fn test_refresh_failure_reauthenticates_once() {
    let (server, mut client) = setup().await;
    // Initial sign-in plus exactly one fallback sign-in.
    mount_sign_in(&server, json!(0), 2).await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate("user@example.com", &password()).await.unwrap();
    client.refresh_access_token().await.unwrap();
}

#[tokio::test]
async fn test_refresh_http_error_reauthenticates() {
    let (server, mut client) = setup().await;
    mount_sign_in(&server, json!(3600), 2).await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate("user@example.com", &password()).await.unwrap();
    client.refresh_access_token().await.unwrap();
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_refresh_and_reauth_both_fail() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a", "r", json!(0))))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    client.authenticate("user@example.com", &password()).await.unwrap();

    Mock::given(method("POST"))
        .and(path("/userapi/users/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "locked"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/userapi/users/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.ensure_valid().await;
    match result {
        Err(Error::Authentication { ref message }) => assert_eq!(message, "locked"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

// ── Device catalog ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .and(query_param("pageSize", "999"))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"uniqueId": "A1", "instanceName": "Bath"}]
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].unique_id, "A1");
    assert_eq!(devices[0].instance_name.as_deref(), Some("Bath"));
}

#[tokio::test]
async fn test_list_devices_without_data_is_empty() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_list_devices_skips_entries_without_id() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"instanceName": "Orphan"},
                {"uniqueId": "B2", "parentSerialNumber": "P-1"}
            ]
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].unique_id, "B2");
    assert_eq!(devices[0].display_name(), "B2");
}

#[tokio::test]
async fn test_list_parent_groups_from_raw_array() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"uniqueId": "A1", "parentSerialNumber": "P-2", "parentInstanceName": "Cabin"},
            {"uniqueId": "A2", "parentSerialNumber": "P-1", "parentInstanceName": "Home"},
            {"uniqueId": "A3", "parentSerialNumber": "P-2", "parentInstanceName": "Renamed"}
        ])))
        .mount(&server)
        .await;

    let groups = client.list_parent_groups().await.unwrap();

    assert_eq!(
        groups,
        vec![
            ParentGroup {
                parent_instance_number: Some("P-2".into()),
                parent_instance_name: Some("Cabin".into()),
            },
            ParentGroup {
                parent_instance_number: Some("P-1".into()),
                parent_instance_name: Some("Home".into()),
            },
        ]
    );
}

#[tokio::test]
async fn test_list_parent_groups_from_data_wrapper() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"uniqueId": "A1", "parentSerialNumber": "P-9", "parentInstanceName": "Office"}]
        })))
        .mount(&server)
        .await;

    let groups = client.list_parent_groups().await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].parent_instance_number.as_deref(), Some("P-9"));
    assert_eq!(groups[0].parent_instance_name.as_deref(), Some("Office"));
}

#[tokio::test]
async fn test_list_parent_groups_unexpected_shape() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "maintenance"})))
        .mount(&server)
        .await;

    assert!(client.list_parent_groups().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_latest_datapoints() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances/A1/latest-datapoint-values"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"dataPointName": "Humidity Average", "value": "45.2"},
            {"dataPointName": "Area OnOff", "value": "1"}
        ])))
        .mount(&server)
        .await;

    let snapshot = client.get_latest_datapoints("A1").await.unwrap();

    assert_eq!(
        snapshot,
        DatapointSnapshot {
            humidity_avg: Some(45.2),
            is_on: Some(true),
            ..Default::default()
        }
    );
}

#[tokio::test]
async fn test_get_latest_datapoints_ignores_array_entries() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances/A1/latest-datapoint-values"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            ["Area OnOff", "1"],
            {"dataPointName": "Humidity Average", "value": 38}
        ])))
        .mount(&server)
        .await;

    let snapshot = client.get_latest_datapoints("A1").await.unwrap();

    assert_eq!(
        snapshot,
        DatapointSnapshot {
            humidity_avg: Some(38.0),
            ..Default::default()
        }
    );
}

#[tokio::test]
async fn test_get_latest_datapoints_non_list_is_empty() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances/A1/latest-datapoint-values"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .mount(&server)
        .await;

    assert!(client.get_latest_datapoints("A1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_json_response_is_empty_object() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances/A1/latest-datapoint-values"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;

    let raw = client
        .get("api/condair/sensor-instances/A1/latest-datapoint-values")
        .await
        .unwrap();
    assert_eq!(raw, json!({}));

    assert!(client.get_latest_datapoints("A1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let (server, mut client) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances/A1/latest-datapoint-values"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;

    let result = client.get_latest_datapoints("A1").await;

    let err = result.unwrap_err();
    assert!(err.is_transient());
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "try later");
        }
        other => panic!("expected HttpStatus error, got: {other:?}"),
    }
}

// ── Actions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_actions() {
    let (server, mut client) = signed_in().await;
    mount_actions(
        &server,
        "A1",
        json!([
            {"id": "act-1", "name": "Area OnOff"},
            {"id": "act-2", "name": "Humidity Reference"},
            {"label": "broken"}
        ]),
    )
    .await;

    let actions = client.list_actions("A1").await.unwrap();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].id, "act-1");
    assert_eq!(actions[1].name, "Humidity Reference");
}

#[tokio::test]
async fn test_set_on_off_invokes_area_action() {
    let (server, mut client) = signed_in().await;
    mount_actions(&server, "A1", json!([{"id": "act-1", "name": "Area OnOff"}])).await;

    Mock::given(method("POST"))
        .and(path("/api/condair/invoke-action"))
        .and(body_json(json!({
            "actionId": "act-1",
            "uniqueId": "A1",
            "variables": [{"value": "1", "varName": "$value$"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.set_on_off("A1", true).await.unwrap();
}

#[tokio::test]
async fn test_set_on_off_off_sends_zero() {
    let (server, mut client) = signed_in().await;
    mount_actions(&server, "A1", json!([{"id": "act-1", "name": "Area OnOff"}])).await;

    Mock::given(method("POST"))
        .and(path("/api/condair/invoke-action"))
        .and(body_json(json!({
            "actionId": "act-1",
            "uniqueId": "A1",
            "variables": [{"value": "0", "varName": "$value$"}]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.set_on_off("A1", false).await.unwrap();
}

#[tokio::test]
async fn test_set_on_off_without_action() {
    let (server, mut client) = signed_in().await;
    mount_actions(&server, "A1", json!([{"id": "act-2", "name": "Humidity Reference"}])).await;

    Mock::given(method("POST"))
        .and(path("/api/condair/invoke-action"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.set_on_off("A1", true).await;

    match result {
        Err(Error::ActionNotFound { ref action, ref device_id }) => {
            assert_eq!(action, "Area OnOff");
            assert_eq!(device_id, "A1");
        }
        other => panic!("expected ActionNotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invoke_action_error_field() {
    let (server, mut client) = signed_in().await;
    mount_actions(&server, "A1", json!([{"id": "act-1", "name": "Area OnOff"}])).await;

    Mock::given(method("POST"))
        .and(path("/api/condair/invoke-action"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "bad id"})))
        .mount(&server)
        .await;

    let result = client.invoke_action("act-1", "A1", "1").await;
    match result {
        Err(Error::ActionRejected { ref message }) => assert_eq!(message, "bad id"),
        other => panic!("expected ActionRejected, got: {other:?}"),
    }

    let result = client.set_on_off("A1", true).await;
    assert!(matches!(result, Err(Error::ActionRejected { .. })));
}

#[tokio::test]
async fn test_set_humidity_reference() {
    let (server, mut client) = signed_in().await;
    mount_actions(
        &server,
        "A1",
        json!([
            {"id": "act-1", "name": "Area OnOff"},
            {"id": "act-2", "name": "Humidity Reference"}
        ]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/condair/invoke-action"))
        .and(body_json(json!({
            "actionId": "act-2",
            "uniqueId": "A1",
            "variables": [{"value": "45", "varName": "$value$"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.set_humidity_reference("A1", 45).await.unwrap();
}

#[tokio::test]
async fn test_set_humidity_reference_without_action() {
    let (server, mut client) = signed_in().await;
    mount_actions(&server, "A1", json!([])).await;

    let result = client.set_humidity_reference("A1", 45).await;
    assert!(matches!(result, Err(Error::ActionNotFound { .. })));
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_close_session_twice_then_reuse() {
    let server = MockServer::start().await;
    mount_sign_in(&server, json!(3600), 1).await;

    Mock::given(method("GET"))
        .and(path("/api/condair/sensor-instances"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"uniqueId": "A1"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = CondairClient::new(Url::parse(&server.uri()).unwrap(), TransportConfig::default());
    client.authenticate("user@example.com", &password()).await.unwrap();
    assert!(client.has_session());

    client.close_session();
    client.close_session();
    assert!(!client.has_session());

    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert!(client.has_session());
}

#[tokio::test]
async fn test_transport_error() {
    let mut client = CondairClient::with_client(Url::parse("http://127.0.0.1:1").unwrap(), reqwest::Client::new());

    let result = client.authenticate("user@example.com", &password()).await;

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "expected Transport error, got: {err:?}");
    assert!(!err.is_auth_error());
}
