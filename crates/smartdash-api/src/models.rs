// ── Wire types for the monitoring API ──
//
// Field names follow the backend's camelCase JSON. Where the backend is
// inconsistent (lowercase `firstname`, `isOnline` vs `online`, ids as
// numbers or strings) the types accept every observed spelling.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

// ── Envelopes ───────────────────────────────────────────────────────

/// A list response: `{ "content": [...] }` (paged) or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Wrapped { content: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Wrapped { content } | Self::Bare(content) => content,
        }
    }
}

/// Generic `{ success, message, data }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Body of endpoints that only report a human-readable outcome.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ── Identifiers ─────────────────────────────────────────────────────

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                match NumberOrString::deserialize(deserializer)? {
                    NumberOrString::Number(n) => Ok(Self(n)),
                    NumberOrString::String(s) => s.trim().parse().map(Self).map_err(|_| {
                        serde::de::Error::custom(format!(
                            "invalid {}: {s:?}",
                            stringify!($name)
                        ))
                    }),
                }
            }
        }
    };
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

numeric_id!(
    /// Backend device identifier.
    DeviceId
);
numeric_id!(
    /// Backend alert identifier.
    AlertId
);

/// Ids the session stores as strings even though the backend sends numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<NumberOrString>::deserialize(deserializer)?.map(|v| match v {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::String(s) => s,
        }),
    )
}

// ── Timestamps ──────────────────────────────────────────────────────

/// Accepts RFC 3339 (`Instant` fields) and zone-less local date-times
/// (`LocalDateTime` fields), treating the latter as UTC.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}"))),
        }
    }
}

// ── Auth ────────────────────────────────────────────────────────────

/// `POST /auth/authenticate` body.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/register` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `PATCH /users/password` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

/// Session issued by login, registration and token verification.
///
/// Verification responses carry only the token.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "secret_string")]
    pub token: SecretString,
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user_id", &self.user_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Per-user notification channel preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email_alerts: bool,
    pub push_notifications: bool,
    pub sms_alerts: bool,
    pub critical_only: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_alerts: true,
            push_notifications: true,
            sms_alerts: false,
            critical_only: false,
        }
    }
}

/// Per-user display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: String,
    pub language: String,
    pub timezone: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            language: "en".into(),
            timezone: "UTC".into(),
        }
    }
}

/// User profile as returned by the profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, alias = "firstname")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastname")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.email.clone().unwrap_or_default(),
        }
    }
}

/// `PATCH /users/profile` body. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_settings: Option<NotificationSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

// ── Devices ─────────────────────────────────────────────────────────

/// Lifecycle status of a device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceStatus {
    Active,
    Inactive,
    Maintenance,
    Retired,
}

/// A monitored device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default, alias = "isOnline", skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(
        default,
        alias = "lastSeenAt",
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts_count: Option<u32>,
}

/// Create/update body: the fields the device form edits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub location: String,
    pub status: DeviceStatus,
}

// ── Sensors ─────────────────────────────────────────────────────────

/// Kind of measurement a sensor produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum SensorType {
    #[serde(alias = "TEMPERATURE", alias = "temperature")]
    Temperature,
    #[serde(alias = "HUMIDITY", alias = "humidity")]
    Humidity,
    #[serde(alias = "PRESSURE", alias = "pressure")]
    Pressure,
    #[serde(rename = "Air_Quality")]
    #[strum(to_string = "Air_Quality", serialize = "air-quality")]
    AirQuality,
    #[serde(rename = "Light_Intensity")]
    #[strum(to_string = "Light_Intensity", serialize = "light-intensity")]
    LightIntensity,
    Motion,
    Voltage,
    Current,
    Power,
    #[serde(rename = "OTHER", alias = "Other", other)]
    #[strum(serialize = "OTHER")]
    Other,
}

/// One sensor measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub device_id: DeviceId,
    pub sensor_type: SensorType,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `POST /devices/sensor-data/{deviceId}` body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub sensor_type: SensorType,
    pub value: f64,
}

// ── Alerts ──────────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    #[serde(alias = "LOW")]
    Low,
    #[serde(alias = "MEDIUM")]
    Medium,
    #[serde(alias = "HIGH")]
    High,
    #[serde(alias = "CRITICAL")]
    Critical,
}

/// An alert raised against a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: AlertId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<DeviceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_by: Option<String>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

/// Acknowledgement filter on alert queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AckFilter {
    Acknowledged,
    Unacknowledged,
}

impl AckFilter {
    pub fn matches(self, alert: &Alert) -> bool {
        match self {
            Self::Acknowledged => alert.acknowledged,
            Self::Unacknowledged => !alert.acknowledged,
        }
    }
}

/// Relative window for alert queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum AlertWindow {
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    LastHour,
    #[serde(rename = "24h")]
    #[strum(serialize = "24h")]
    LastDay,
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    LastWeek,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    LastMonth,
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    All,
}

/// Query filters for `GET /alerts/getAllAlerts`. Unset fields are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub status: Option<AckFilter>,
    pub device_id: Option<DeviceId>,
    pub date_range: Option<AlertWindow>,
}

impl AlertFilter {
    /// Only alerts nobody has acknowledged yet.
    pub fn unacknowledged() -> Self {
        Self {
            status: Some(AckFilter::Unacknowledged),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(severity) = self.severity {
            params.push(("severity", severity.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(device_id) = self.device_id {
            params.push(("deviceId", device_id.to_string()));
        }
        if let Some(window) = self.date_range {
            params.push(("dateRange", window.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    #[test]
    fn list_payload_accepts_both_shapes() {
        let wrapped: ListPayload<i32> = serde_json::from_value(json!({"content": [1, 2]})).unwrap();
        let bare: ListPayload<i32> = serde_json::from_value(json!([3])).unwrap();
        assert_eq!(wrapped.into_vec(), vec![1, 2]);
        assert_eq!(bare.into_vec(), vec![3]);
    }

    #[test]
    fn envelope_data_is_optional_for_any_payload() {
        let bare: ApiResponse<User> =
            serde_json::from_value(json!({"success": true, "message": "ok"})).unwrap();
        assert!(bare.success);
        assert!(bare.data.is_none());
    }

    #[test]
    fn unknown_sensor_type_maps_to_other() {
        let types: Vec<SensorType> =
            serde_json::from_value(json!(["Temperature", "CO2", "HUMIDITY"])).unwrap();
        assert_eq!(
            types,
            vec![SensorType::Temperature, SensorType::Other, SensorType::Humidity]
        );
    }

    #[test]
    fn auth_response_accepts_numeric_user_id() {
        let auth: AuthResponse =
            serde_json::from_value(json!({"userId": 42, "token": "tok-x"})).unwrap();
        assert_eq!(auth.user_id.as_deref(), Some("42"));
        assert_eq!(auth.token.expose_secret(), "tok-x");
        assert!(!format!("{auth:?}").contains("tok-x"));
    }

    #[test]
    fn verification_response_may_omit_user_id() {
        let auth: AuthResponse = serde_json::from_value(json!({"token": "t"})).unwrap();
        assert_eq!(auth.user_id, None);
    }

    #[test]
    fn user_accepts_lowercase_name_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "firstname": "Ada",
            "lastname": "Lovelace",
            "email": "ada@example.com",
            "preferences": {"theme": "dark"}
        }))
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("7"));
        assert_eq!(user.display_name(), "Ada Lovelace");
        let prefs = user.preferences.unwrap();
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.language, "en");
    }

    #[test]
    fn device_accepts_backend_spelling() {
        let device: Device = serde_json::from_value(json!({
            "id": 3,
            "name": "Boiler",
            "type": "Thermostat",
            "location": "Basement",
            "status": "Active",
            "isOnline": true,
            "lastSeenAt": "2024-05-01T12:30:00",
            "latitude": 48.85,
            "longitude": 2.35,
            "alertsCount": 2
        }))
        .unwrap();
        assert_eq!(device.id, DeviceId(3));
        assert_eq!(device.online, Some(true));
        assert_eq!(device.status, Some(DeviceStatus::Active));
        assert_eq!(
            device.last_seen.unwrap().to_rfc3339(),
            "2024-05-01T12:30:00+00:00"
        );
    }

    #[test]
    fn reading_ids_may_be_strings() {
        let reading: SensorReading = serde_json::from_value(json!({
            "deviceId": "5",
            "sensorType": "Temperature",
            "value": 21.5,
            "timestamp": "2024-05-01T12:30:00.000Z"
        }))
        .unwrap();
        assert_eq!(reading.device_id, DeviceId(5));
        assert!(reading.timestamp.is_some());
    }

    #[test]
    fn sensor_type_wire_names() {
        assert_eq!(
            serde_json::to_value(SensorType::AirQuality).unwrap(),
            json!("Air_Quality")
        );
        assert_eq!(
            serde_json::from_value::<SensorType>(json!("OTHER")).unwrap(),
            SensorType::Other
        );
        assert_eq!("humidity".parse::<SensorType>().unwrap(), SensorType::Humidity);
    }

    #[test]
    fn alert_filter_omits_unset_fields() {
        let filter = AlertFilter {
            severity: Some(Severity::Critical),
            device_id: Some(DeviceId(9)),
            date_range: Some(AlertWindow::LastDay),
            ..AlertFilter::default()
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("severity", "Critical".to_owned()),
                ("deviceId", "9".to_owned()),
                ("dateRange", "24h".to_owned()),
            ]
        );
        assert_eq!(
            AlertFilter::unacknowledged().to_query(),
            vec![("status", "Unacknowledged".to_owned())]
        );
    }

    #[test]
    fn naive_alert_timestamps_parse_as_utc() {
        let alert: Alert = serde_json::from_value(json!({
            "id": 1,
            "severity": "High",
            "message": "Overheat",
            "createdAt": "2024-05-01T08:00:00.123",
            "acknowledged": false
        }))
        .unwrap();
        assert_eq!(alert.created_at.unwrap().timestamp(), 1_714_550_400);
    }
}
