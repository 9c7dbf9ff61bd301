#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smartdash_api::models::{
    AlertFilter, AlertId, AlertWindow, DeviceDraft, DeviceId, DeviceStatus, NewReading,
    PasswordChange, ProfileUpdate, SensorType, Severity,
};
use smartdash_api::{Anonymous, ApiClient, CredentialSource, Error, StaticCredentials};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with(credentials: Arc<dyn CredentialSource>) -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base = format!("{}/api/v1", server.uri());
    let client = ApiClient::with_client(reqwest::Client::new(), &base, credentials).unwrap();
    (server, client)
}

async fn setup() -> (MockServer, ApiClient) {
    setup_with(Arc::new(StaticCredentials::new("tok-x", "42"))).await
}

fn device_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "Thermostat",
        "location": "Lab",
        "status": "Active",
        "isOnline": true
    })
}

// ── Auth headers ────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_headers_attached() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/getAllDevices"))
        .and(header("Authorization", "Bearer tok-x"))
        .and(header("X-User-Id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_auth_headers() {
    let (server, client) = setup_with(Arc::new(Anonymous)).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/sensor-data/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client.latest_readings().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
    assert!(!requests[0].headers.contains_key("x-user-id"));
}

// ── Auth endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn test_login_returns_session() {
    let (server, client) = setup_with(Arc::new(Anonymous)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/authenticate"))
        .and(body_json(json!({"email": "a@b.com", "password": "password1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"userId": 42, "token": "tok-x"})),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("password1".to_owned());
    let session = client.login("a@b.com", &password).await.unwrap();
    assert_eq!(session.user_id.as_deref(), Some("42"));
    assert_eq!(session.token.expose_secret(), "tok-x");
}

#[tokio::test]
async fn test_rejection_message_is_parsed() {
    let (server, client) = setup_with(Arc::new(Anonymous)).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/authenticate"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let password = SecretString::from("password1".to_owned());
    let err = client.login("a@b.com", &password).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.payload_message(), Some("Bad credentials"));
}

#[tokio::test]
async fn test_rejection_without_json_body_has_no_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/getAllDevices"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(
        matches!(err, Error::Rejected { status: 500, message: None, .. }),
        "expected Rejected without message, got: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_verify_token_sends_explicit_bearer() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/verify-token"))
        .and(header("Authorization", "Bearer tok-x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok-y"})))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.verify_token().await.unwrap();
    assert_eq!(session.token.expose_secret(), "tok-y");
    assert_eq!(session.user_id, None);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("authorization").iter().count(), 1);
}

#[tokio::test]
async fn test_update_profile_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/profile"))
        .and(body_json(json!({"firstName": "Ada"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Profile updated",
            "data": {"id": 42, "firstname": "Ada", "lastname": "Lovelace", "email": "ada@x.io"}
        })))
        .mount(&server)
        .await;

    let update = ProfileUpdate {
        first_name: Some("Ada".into()),
        ..ProfileUpdate::default()
    };
    let user = client.update_profile(&update).await.unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Ada"));
    assert_eq!(user.last_name.as_deref(), Some("Lovelace"));
}

#[tokio::test]
async fn test_update_profile_without_data_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let err = client
        .update_profile(&ProfileUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingData { .. }));
}

#[tokio::test]
async fn test_change_password_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/users/password"))
        .and(body_json(json!({
            "currentPassword": "old-pass1",
            "newPassword": "new-pass1",
            "confirmPassword": "new-pass1"
        })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client
        .change_password(&PasswordChange {
            current_password: "old-pass1",
            new_password: "new-pass1",
            confirm_password: "new-pass1",
        })
        .await
        .unwrap();
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_crud_paths() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/getDeviceById/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_json(3, "Boiler")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/devices/createDevice"))
        .and(body_json(json!({
            "name": "Boiler",
            "type": "Thermostat",
            "location": "Lab",
            "status": "Active"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(device_json(3, "Boiler")))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/devices/updateDevice/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_json(3, "Boiler 2")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/devices/deleteDevice/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let draft = DeviceDraft {
        name: "Boiler".into(),
        device_type: "Thermostat".into(),
        location: "Lab".into(),
        status: DeviceStatus::Active,
    };

    let fetched = client.get_device(DeviceId(3)).await.unwrap();
    assert_eq!(fetched.online, Some(true));

    let created = client.create_device(&draft).await.unwrap();
    assert_eq!(created.id, DeviceId(3));

    let updated = client.update_device(DeviceId(3), &draft).await.unwrap();
    assert_eq!(updated.name, "Boiler 2");

    let removed = client.delete_device(DeviceId(3)).await.unwrap();
    assert_eq!(removed, DeviceId(3));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/getAllDevices"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.list_devices().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

// ── Sensors ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sensor_series_sends_date_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/sensor-data/5"))
        .and(query_param("startDate", "2024-05-01T00:00:00.000Z"))
        .and(query_param("endDate", "2024-05-08T00:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "deviceId": 5,
                "sensorType": "Temperature",
                "value": 21.5,
                "unit": "C",
                "timestamp": "2024-05-02T10:00:00.000Z"
            }]
        })))
        .mount(&server)
        .await;

    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 8, 0, 0, 0).unwrap();
    let series = client.sensor_series(DeviceId(5), start, end).await.unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].sensor_type, SensorType::Temperature);
}

#[tokio::test]
async fn test_device_sensor_catalog_and_append() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/sensors/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Temperature", "Humidity"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/devices/sensor-data/5"))
        .and(body_json(json!({"sensorType": "Temperature", "value": 10.0})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "deviceId": 5,
            "sensorType": "Temperature",
            "value": 10.0
        })))
        .mount(&server)
        .await;

    let catalog = client.device_sensors(DeviceId(5)).await.unwrap();
    assert_eq!(catalog, vec![SensorType::Temperature, SensorType::Humidity]);

    let reading = client
        .add_reading(
            DeviceId(5),
            &NewReading {
                sensor_type: SensorType::Temperature,
                value: 10.0,
            },
        )
        .await
        .unwrap();
    assert_eq!(reading.device_id, DeviceId(5));
}

// ── Alerts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_alert_filters_become_query_params() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/alerts/getAllAlerts"))
        .and(query_param("severity", "High"))
        .and(query_param("dateRange", "7d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{
                "id": 11,
                "deviceId": 5,
                "severity": "High",
                "message": "Overheat",
                "createdAt": "2024-05-01T08:00:00",
                "acknowledged": false
            }]
        })))
        .mount(&server)
        .await;

    let filter = AlertFilter {
        severity: Some(Severity::High),
        date_range: Some(AlertWindow::LastWeek),
        ..AlertFilter::default()
    };
    let alerts = client.list_alerts(&filter).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, AlertId(11));
    assert_eq!(alerts[0].device_id, Some(DeviceId(5)));
}

#[tokio::test]
async fn test_acknowledge_alert() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/alerts/acknowledgeAlert/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 11,
            "severity": "High",
            "message": "Overheat",
            "acknowledged": true,
            "acknowledgedBy": "ada@x.io"
        })))
        .mount(&server)
        .await;

    let alert = client.acknowledge_alert(AlertId(11)).await.unwrap();
    assert!(alert.acknowledged);
    assert_eq!(alert.acknowledged_by.as_deref(), Some("ada@x.io"));
}
