// ── Sensors container ──
//
// Four independent request families share this record: the time series
// for the selected device, the latest-reading snapshot, the per-device
// sensor catalog, and single-reading appends. Each family owns its own
// status pair; no family writes another's.

use std::collections::HashMap;

use tracing::debug;

use super::{Lifecycle, OpStatus};
use crate::model::{DateRange, DeviceId, SensorReading, SensorType};

const SERIES_FAILED: &str = "Failed to fetch sensor data";
const LATEST_FAILED: &str = "Failed to fetch latest readings";
const CATALOG_FAILED: &str = "Failed to fetch device sensors";
const APPEND_FAILED: &str = "Failed to add sensor reading";

/// Catalog fetch payload: the sensors available on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSensors {
    pub device_id: DeviceId,
    pub sensors: Vec<SensorType>,
}

#[derive(Debug, Clone)]
pub enum SensorEvent {
    SetCurrentDevice(Option<DeviceId>),
    SetCurrentSensorType(Option<SensorType>),
    SetDateRange(DateRange),
    /// Drop the fetched time series.
    ClearSensorData,
    /// Reset the error of every family.
    ClearErrors,
    FetchSeries(Lifecycle<Vec<SensorReading>>),
    FetchLatest(Lifecycle<Vec<SensorReading>>),
    FetchDeviceSensors(Lifecycle<DeviceSensors>),
    AddReading(Lifecycle<SensorReading>),
}

/// Sensors container state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorsState {
    pub current_device_id: Option<DeviceId>,
    pub current_sensor_type: Option<SensorType>,
    pub date_range: DateRange,
    /// Last fetched series, newest appends first.
    pub series: Vec<SensorReading>,
    /// One entry per (device, sensor type).
    pub latest: Vec<SensorReading>,
    /// Sensor catalog per device; entries are merged, never removed.
    pub device_sensors: HashMap<DeviceId, Vec<SensorType>>,
    pub series_status: OpStatus,
    pub latest_status: OpStatus,
    pub catalog_status: OpStatus,
    pub append_status: OpStatus,
}

impl SensorsState {
    /// Whether `reading` belongs to the active (device, sensor type) pair.
    pub fn is_current(&self, reading: &SensorReading) -> bool {
        self.current_device_id == Some(reading.device_id)
            && self.current_sensor_type == Some(reading.sensor_type)
    }

    pub fn reduce(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::SetCurrentDevice(id) => self.current_device_id = id,
            SensorEvent::SetCurrentSensorType(kind) => self.current_sensor_type = kind,
            SensorEvent::SetDateRange(range) => self.date_range = range,
            SensorEvent::ClearSensorData => self.series.clear(),
            SensorEvent::ClearErrors => {
                for status in [
                    &mut self.series_status,
                    &mut self.latest_status,
                    &mut self.catalog_status,
                    &mut self.append_status,
                ] {
                    status.error = None;
                }
            }
            SensorEvent::FetchSeries(step) => {
                if let Some(series) = self.series_status.track(step, SERIES_FAILED) {
                    self.series = series;
                }
            }
            SensorEvent::FetchLatest(step) => {
                if let Some(latest) = self.latest_status.track(step, LATEST_FAILED) {
                    self.latest = latest;
                }
            }
            SensorEvent::FetchDeviceSensors(step) => {
                if let Some(DeviceSensors { device_id, sensors }) =
                    self.catalog_status.track(step, CATALOG_FAILED)
                {
                    self.device_sensors.insert(device_id, sensors);
                }
            }
            SensorEvent::AddReading(step) => {
                if let Some(reading) = self.append_status.track(step, APPEND_FAILED) {
                    self.splice(reading);
                }
            }
        }
    }

    fn splice(&mut self, reading: SensorReading) {
        if let Some(slot) = self.latest.iter_mut().find(|r| {
            r.device_id == reading.device_id && r.sensor_type == reading.sensor_type
        }) {
            *slot = reading.clone();
        }
        if self.is_current(&reading) {
            self.series.insert(0, reading);
        } else {
            debug!(
                device_id = %reading.device_id,
                sensor_type = %reading.sensor_type,
                "appended reading is outside the current selection"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::Rejection;

    fn reading(device: i64, kind: SensorType, value: f64) -> SensorReading {
        SensorReading {
            id: None,
            device_id: DeviceId(device),
            sensor_type: kind,
            value,
            unit: None,
            timestamp: None,
        }
    }

    fn selected(device: i64, kind: SensorType) -> SensorsState {
        let mut state = SensorsState::default();
        state.reduce(SensorEvent::SetCurrentDevice(Some(DeviceId(device))));
        state.reduce(SensorEvent::SetCurrentSensorType(Some(kind)));
        state.reduce(SensorEvent::FetchSeries(Lifecycle::Fulfilled(vec![reading(
            device, kind, 1.0,
        )])));
        state
    }

    #[test]
    fn append_for_other_device_leaves_series_unchanged() {
        let mut state = selected(5, SensorType::Temperature);
        let before = state.series.clone();

        state.reduce(SensorEvent::AddReading(Lifecycle::Fulfilled(reading(
            6,
            SensorType::Temperature,
            10.0,
        ))));

        assert_eq!(state.series, before);
    }

    #[test]
    fn append_for_current_pair_prepends() {
        let mut state = selected(5, SensorType::Temperature);
        state.reduce(SensorEvent::AddReading(Lifecycle::Fulfilled(reading(
            5,
            SensorType::Temperature,
            10.0,
        ))));
        let values: Vec<f64> = state.series.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![10.0, 1.0]);
    }

    #[test]
    fn append_patches_matching_latest_entry_only() {
        let mut state = SensorsState::default();
        state.reduce(SensorEvent::FetchLatest(Lifecycle::Fulfilled(vec![
            reading(5, SensorType::Temperature, 20.0),
            reading(5, SensorType::Humidity, 40.0),
        ])));

        state.reduce(SensorEvent::AddReading(Lifecycle::Fulfilled(reading(
            5,
            SensorType::Humidity,
            55.0,
        ))));
        state.reduce(SensorEvent::AddReading(Lifecycle::Fulfilled(reading(
            7,
            SensorType::Power,
            1.0,
        ))));

        let values: Vec<f64> = state.latest.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![20.0, 55.0]);
    }

    #[test]
    fn family_failures_are_isolated() {
        let mut state = SensorsState::default();
        state.reduce(SensorEvent::FetchSeries(Lifecycle::Pending));
        state.reduce(SensorEvent::FetchLatest(Lifecycle::Pending));
        state.reduce(SensorEvent::FetchLatest(Lifecycle::Rejected(Rejection::default())));

        assert!(state.series_status.loading);
        assert_eq!(state.series_status.error, None);
        assert!(!state.latest_status.loading);
        assert_eq!(state.latest_status.error.as_deref(), Some(LATEST_FAILED));
        assert_eq!(state.catalog_status, OpStatus::default());
        assert_eq!(state.append_status, OpStatus::default());
    }

    #[test]
    fn catalog_entries_merge_per_device() {
        let mut state = SensorsState::default();
        state.reduce(SensorEvent::FetchDeviceSensors(Lifecycle::Fulfilled(
            DeviceSensors {
                device_id: DeviceId(1),
                sensors: vec![SensorType::Temperature],
            },
        )));
        state.reduce(SensorEvent::FetchDeviceSensors(Lifecycle::Fulfilled(
            DeviceSensors {
                device_id: DeviceId(2),
                sensors: vec![SensorType::Motion],
            },
        )));
        assert_eq!(state.device_sensors.len(), 2);
        assert_eq!(
            state.device_sensors[&DeviceId(1)],
            vec![SensorType::Temperature]
        );
    }

    #[test]
    fn clear_errors_and_clear_data() {
        let mut state = selected(5, SensorType::Temperature);
        state.reduce(SensorEvent::FetchDeviceSensors(Lifecycle::Rejected(
            Rejection::new("boom"),
        )));
        state.reduce(SensorEvent::AddReading(Lifecycle::Rejected(Rejection::default())));

        state.reduce(SensorEvent::ClearErrors);
        state.reduce(SensorEvent::ClearSensorData);

        assert_eq!(state.catalog_status.error, None);
        assert_eq!(state.append_status.error, None);
        assert!(state.series.is_empty());
        assert_eq!(state.current_device_id, Some(DeviceId(5)));
    }
}
