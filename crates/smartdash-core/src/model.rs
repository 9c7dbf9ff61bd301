// ── Domain model ──
//
// The wire types from smartdash-api are the domain entities; this module
// re-exports them and adds the client-side filter types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use smartdash_api::models::{
    AckFilter, Alert, AlertFilter, AlertId, AlertWindow, AuthResponse, Device, DeviceDraft,
    DeviceId, DeviceStatus, NotificationSettings, Preferences, ProfileUpdate, SensorReading,
    SensorType, Severity, User,
};

/// Inclusive time window for telemetry and alert views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// The last `days` days, ending now.
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

impl Default for DateRange {
    /// Last 7 days.
    fn default() -> Self {
        Self::last_days(7)
    }
}

/// Client-side filter over the device table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    pub status: Option<DeviceStatus>,
    pub device_type: Option<String>,
    pub location: Option<String>,
    /// Case-insensitive substring of the name or location.
    pub search: Option<String>,
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        if self.status.is_some() && device.status != self.status {
            return false;
        }
        if let Some(wanted) = &self.device_type {
            if device.device_type.as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = &self.location {
            if device.location.as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let hit = |field: Option<&str>| {
                    field.is_some_and(|value| value.to_lowercase().contains(&needle))
                };
                hit(Some(&device.name)) || hit(device.location.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, location: &str, status: DeviceStatus) -> Device {
        Device {
            id: DeviceId(1),
            name: name.into(),
            device_type: Some("Thermostat".into()),
            location: Some(location.into()),
            status: Some(status),
            online: None,
            last_seen: None,
            latitude: None,
            longitude: None,
            alerts_count: None,
        }
    }

    #[test]
    fn default_range_spans_a_week() {
        let range = DateRange::default();
        assert_eq!((range.end - range.start).num_days(), 7);
        assert!(range.contains(range.end));
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_location() {
        let boiler = device("Boiler", "Basement", DeviceStatus::Active);
        let by_location = DeviceFilter {
            search: Some("BASE".into()),
            ..DeviceFilter::default()
        };
        let by_name = DeviceFilter {
            search: Some("boil".into()),
            ..DeviceFilter::default()
        };
        let miss = DeviceFilter {
            search: Some("attic".into()),
            ..DeviceFilter::default()
        };
        assert!(by_location.matches(&boiler));
        assert!(by_name.matches(&boiler));
        assert!(!miss.matches(&boiler));
    }

    #[test]
    fn all_criteria_must_hold() {
        let boiler = device("Boiler", "Basement", DeviceStatus::Maintenance);
        let filter = DeviceFilter {
            status: Some(DeviceStatus::Active),
            device_type: Some("Thermostat".into()),
            ..DeviceFilter::default()
        };
        assert!(!filter.matches(&boiler));
        assert!(DeviceFilter::default().matches(&boiler));
    }
}
