// ── Devices container ──
//
// Server-confirmed CRUD over the device collection. A failed mutation
// leaves the collection untouched; only the status pair records it.

use super::{Lifecycle, OpStatus};
use crate::model::{Device, DeviceId};

const FETCH_FAILED: &str = "Failed to fetch devices";
const CREATE_FAILED: &str = "Failed to create device";
const UPDATE_FAILED: &str = "Failed to update device";
const DELETE_FAILED: &str = "Failed to delete device";

#[derive(Debug, Clone)]
pub enum DeviceEvent {
    Fetch(Lifecycle<Vec<Device>>),
    Create(Lifecycle<Device>),
    Update(Lifecycle<Device>),
    /// Fulfilled with the id that was removed.
    Delete(Lifecycle<DeviceId>),
}

/// Devices container state. Ids are unique within `devices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicesState {
    pub devices: Vec<Device>,
    pub status: OpStatus,
}

impl DevicesState {
    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn reduce(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Fetch(step) => {
                if let Some(devices) = self.status.track(step, FETCH_FAILED) {
                    self.devices = devices;
                }
            }
            DeviceEvent::Create(step) => {
                if let Some(device) = self.status.track(step, CREATE_FAILED) {
                    match self.devices.iter_mut().find(|d| d.id == device.id) {
                        Some(existing) => *existing = device,
                        None => self.devices.push(device),
                    }
                }
            }
            DeviceEvent::Update(step) => {
                if let Some(device) = self.status.track(step, UPDATE_FAILED) {
                    if let Some(existing) = self.devices.iter_mut().find(|d| d.id == device.id) {
                        *existing = device;
                    }
                }
            }
            DeviceEvent::Delete(step) => {
                if let Some(id) = self.status.track(step, DELETE_FAILED) {
                    self.devices.retain(|d| d.id != id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::state::Rejection;

    fn device(id: i64, name: &str) -> Device {
        Device {
            id: DeviceId(id),
            name: name.into(),
            device_type: None,
            location: None,
            status: None,
            online: None,
            last_seen: None,
            latitude: None,
            longitude: None,
            alerts_count: None,
        }
    }

    fn ids(state: &DevicesState) -> Vec<i64> {
        state.devices.iter().map(|d| d.id.0).collect()
    }

    fn loaded(devices: Vec<Device>) -> DevicesState {
        let mut state = DevicesState::default();
        state.reduce(DeviceEvent::Fetch(Lifecycle::Fulfilled(devices)));
        state
    }

    #[test]
    fn fetch_replaces_collection() {
        let mut state = loaded(vec![device(1, "a"), device(2, "b")]);
        state.reduce(DeviceEvent::Fetch(Lifecycle::Pending));
        assert!(state.status.loading);
        state.reduce(DeviceEvent::Fetch(Lifecycle::Fulfilled(vec![device(3, "c")])));
        assert_eq!(ids(&state), vec![3]);
        assert!(!state.status.loading);
    }

    #[test]
    fn delete_removes_by_id() {
        let mut state = loaded(vec![device(1, "a"), device(2, "b")]);
        state.reduce(DeviceEvent::Delete(Lifecycle::Pending));
        state.reduce(DeviceEvent::Delete(Lifecycle::Fulfilled(DeviceId(1))));
        assert_eq!(ids(&state), vec![2]);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut state = loaded(vec![device(1, "a"), device(2, "b")]);
        state.reduce(DeviceEvent::Update(Lifecycle::Fulfilled(device(1, "renamed"))));
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.get(DeviceId(1)).map(|d| d.name.as_str()), Some("renamed"));
    }

    #[test]
    fn update_of_unknown_device_is_ignored() {
        let mut state = loaded(vec![device(1, "a")]);
        state.reduce(DeviceEvent::Update(Lifecycle::Fulfilled(device(9, "ghost"))));
        assert_eq!(ids(&state), vec![1]);
    }

    #[test]
    fn create_appends_and_keeps_ids_unique() {
        let mut state = loaded(vec![device(1, "a")]);
        state.reduce(DeviceEvent::Create(Lifecycle::Fulfilled(device(2, "b"))));
        state.reduce(DeviceEvent::Create(Lifecycle::Fulfilled(device(2, "b2"))));
        assert_eq!(ids(&state), vec![1, 2]);
        assert_eq!(state.get(DeviceId(2)).map(|d| d.name.as_str()), Some("b2"));
    }

    #[test]
    fn failed_mutation_leaves_collection_untouched() {
        let before = loaded(vec![device(1, "a"), device(2, "b")]);
        let mut state = before.clone();

        state.reduce(DeviceEvent::Delete(Lifecycle::Pending));
        state.reduce(DeviceEvent::Delete(Lifecycle::Rejected(Rejection::default())));

        assert_eq!(state.devices, before.devices);
        assert!(!state.status.loading);
        assert_eq!(state.status.error.as_deref(), Some(DELETE_FAILED));
    }
}
