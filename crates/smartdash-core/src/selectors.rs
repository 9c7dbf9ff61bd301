// ── Derived views ──
//
// Pure projections over container state, recomputed on read. Nothing
// here mutates a container.

use std::sync::{Arc, LazyLock};

use serde::Serialize;

use crate::model::{
    Alert, AlertFilter, Device, DeviceFilter, DeviceId, DeviceStatus, SensorReading, SensorType,
};
use crate::state::{AlertsState, SensorsState};

// ── Sensors ─────────────────────────────────────────────────────────

/// Series entries for the selected (device, sensor type) pair; empty while
/// either half of the selection is unset.
pub fn select_current_sensor_data(state: &SensorsState) -> Vec<SensorReading> {
    let (Some(device_id), Some(sensor_type)) = (state.current_device_id, state.current_sensor_type)
    else {
        return Vec::new();
    };
    state
        .series
        .iter()
        .filter(|r| r.device_id == device_id && r.sensor_type == sensor_type)
        .cloned()
        .collect()
}

/// Sensor catalog of one device; empty when it was never fetched.
pub fn select_device_sensors(state: &SensorsState, device_id: DeviceId) -> &[SensorType] {
    state
        .device_sensors
        .get(&device_id)
        .map_or(&[], Vec::as_slice)
}

pub fn select_latest_readings(state: &SensorsState) -> &[SensorReading] {
    &state.latest
}

/// Latest readings of one sensor type (the dashboard chart series).
pub fn latest_by_type(readings: &[SensorReading], sensor_type: SensorType) -> Vec<&SensorReading> {
    readings
        .iter()
        .filter(|r| r.sensor_type == sensor_type)
        .collect()
}

// ── Alerts ──────────────────────────────────────────────────────────

static NO_ALERTS: LazyLock<Arc<Vec<Alert>>> = LazyLock::new(|| Arc::new(Vec::new()));

/// Unacknowledged alerts.
///
/// Every empty result is the same shared allocation, so consumers can
/// skip work with `Arc::ptr_eq`.
pub fn select_unread_alerts(state: &AlertsState) -> Arc<Vec<Alert>> {
    let unread: Vec<Alert> = state
        .alerts
        .iter()
        .filter(|a| !a.acknowledged)
        .cloned()
        .collect();
    if unread.is_empty() {
        Arc::clone(&NO_ALERTS)
    } else {
        Arc::new(unread)
    }
}

/// Memoized [`select_unread_alerts`]: recomputes only when the alert
/// collection is a different allocation than last time.
#[derive(Debug, Default)]
pub struct UnreadAlerts {
    input: Option<Arc<Vec<Alert>>>,
    output: Option<Arc<Vec<Alert>>>,
}

impl UnreadAlerts {
    pub fn select(&mut self, state: &AlertsState) -> Arc<Vec<Alert>> {
        if let (Some(input), Some(output)) = (&self.input, &self.output) {
            if Arc::ptr_eq(input, &state.alerts) {
                return Arc::clone(output);
            }
        }
        let output = select_unread_alerts(state);
        self.input = Some(Arc::clone(&state.alerts));
        self.output = Some(Arc::clone(&output));
        output
    }
}

/// Client-side alert filter (severity, acknowledgement, device).
///
/// The relative date window is evaluated by the server and ignored here.
pub fn filter_alerts<'a>(alerts: &'a [Alert], filter: &AlertFilter) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|a| filter.severity.is_none_or(|s| a.severity == s))
        .filter(|a| filter.status.is_none_or(|s| s.matches(a)))
        .filter(|a| filter.device_id.is_none_or(|id| a.device_id == Some(id)))
        .collect()
}

// ── Devices ─────────────────────────────────────────────────────────

pub fn filter_devices<'a>(devices: &'a [Device], filter: &DeviceFilter) -> Vec<&'a Device> {
    devices.iter().filter(|d| filter.matches(d)).collect()
}

/// Dashboard status tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub active: usize,
}

pub fn device_status_summary(devices: &[Device]) -> StatusSummary {
    devices.iter().fold(
        StatusSummary {
            total: devices.len(),
            ..StatusSummary::default()
        },
        |mut acc, d| {
            match d.online {
                Some(true) => acc.online += 1,
                Some(false) => acc.offline += 1,
                None => {}
            }
            if d.status == Some(DeviceStatus::Active) {
                acc.active += 1;
            }
            acc
        },
    )
}

/// A device that can be placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub id: DeviceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<DeviceStatus>,
    pub online: Option<bool>,
}

/// Devices that carry both coordinates.
pub fn map_markers(devices: &[Device]) -> Vec<MapMarker> {
    devices
        .iter()
        .filter_map(|d| {
            Some(MapMarker {
                id: d.id,
                name: d.name.clone(),
                latitude: d.latitude?,
                longitude: d.longitude?,
                status: d.status,
                online: d.online,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{AckFilter, AlertId, Severity};
    use crate::state::{AlertEvent, Lifecycle, SensorEvent};

    fn reading(device: i64, kind: SensorType) -> SensorReading {
        SensorReading {
            id: None,
            device_id: DeviceId(device),
            sensor_type: kind,
            value: 1.0,
            unit: None,
            timestamp: None,
        }
    }

    fn alert(id: i64, device: i64, severity: Severity, acknowledged: bool) -> Alert {
        Alert {
            id: AlertId(id),
            device_id: Some(DeviceId(device)),
            device_name: None,
            alert_type: None,
            severity,
            message: String::new(),
            status: None,
            created_at: None,
            acknowledged,
            acknowledged_by: None,
            acknowledged_at: None,
        }
    }

    fn device(id: i64, online: Option<bool>, status: DeviceStatus, coords: bool) -> Device {
        Device {
            id: DeviceId(id),
            name: format!("d{id}"),
            device_type: None,
            location: None,
            status: Some(status),
            online,
            last_seen: None,
            latitude: coords.then_some(48.0),
            longitude: coords.then_some(2.0),
            alerts_count: None,
        }
    }

    #[test]
    fn current_sensor_data_needs_full_selection() {
        let mut state = SensorsState::default();
        state.reduce(SensorEvent::FetchSeries(Lifecycle::Fulfilled(vec![
            reading(5, SensorType::Temperature),
            reading(5, SensorType::Humidity),
        ])));
        assert!(select_current_sensor_data(&state).is_empty());

        state.reduce(SensorEvent::SetCurrentDevice(Some(DeviceId(5))));
        assert!(select_current_sensor_data(&state).is_empty());

        state.reduce(SensorEvent::SetCurrentSensorType(Some(SensorType::Humidity)));
        assert_eq!(select_current_sensor_data(&state).len(), 1);

        state.reduce(SensorEvent::SetCurrentDevice(Some(DeviceId(6))));
        assert!(select_current_sensor_data(&state).is_empty());
    }

    #[test]
    fn unknown_device_has_no_sensors() {
        let state = SensorsState::default();
        assert!(select_device_sensors(&state, DeviceId(1)).is_empty());
    }

    #[test]
    fn empty_unread_view_is_a_stable_reference() {
        let state = AlertsState::default();
        let first = select_unread_alerts(&state);
        let second = select_unread_alerts(&state);
        assert!(first.is_empty());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn memo_recomputes_only_on_new_collection() {
        let mut state = AlertsState::default();
        state.reduce(AlertEvent::Fetch(Lifecycle::Fulfilled(vec![
            alert(1, 1, Severity::Low, false),
            alert(2, 1, Severity::Low, true),
        ])));
        let mut memo = UnreadAlerts::default();

        let first = memo.select(&state);
        let again = memo.select(&state);
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &again));

        state.reduce(AlertEvent::Acknowledge(Lifecycle::Fulfilled(alert(
            1,
            1,
            Severity::Low,
            true,
        ))));
        let after = memo.select(&state);
        assert!(after.is_empty());
        assert!(Arc::ptr_eq(&after, &select_unread_alerts(&AlertsState::default())));
    }

    #[test]
    fn alert_filter_combines_criteria() {
        let alerts = vec![
            alert(1, 1, Severity::Critical, false),
            alert(2, 1, Severity::Critical, true),
            alert(3, 2, Severity::Critical, false),
            alert(4, 1, Severity::Low, false),
        ];
        let filter = AlertFilter {
            severity: Some(Severity::Critical),
            status: Some(AckFilter::Unacknowledged),
            device_id: Some(DeviceId(1)),
            date_range: None,
        };
        let ids: Vec<i64> = filter_alerts(&alerts, &filter)
            .iter()
            .map(|a| a.id.0)
            .collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(filter_alerts(&alerts, &AlertFilter::default()).len(), 4);
    }

    #[test]
    fn status_summary_counts() {
        let devices = vec![
            device(1, Some(true), DeviceStatus::Active, true),
            device(2, Some(false), DeviceStatus::Active, false),
            device(3, None, DeviceStatus::Retired, true),
        ];
        assert_eq!(
            device_status_summary(&devices),
            StatusSummary {
                total: 3,
                online: 1,
                offline: 1,
                active: 2,
            }
        );
        let markers = map_markers(&devices);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[1].id, DeviceId(3));
    }

    #[test]
    fn latest_by_type_filters() {
        let readings = vec![
            reading(1, SensorType::Temperature),
            reading(2, SensorType::Humidity),
            reading(3, SensorType::Temperature),
        ];
        assert_eq!(latest_by_type(&readings, SensorType::Temperature).len(), 2);
    }
}
