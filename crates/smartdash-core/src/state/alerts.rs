// ── Alerts container ──
//
// Fetch replaces the collection for the filter it was issued with.
// Acknowledgement replaces the matching entry and never removes it, even
// when the last fetch asked for unacknowledged alerts only.

use std::sync::Arc;

use super::{Lifecycle, OpStatus};
use crate::model::{Alert, DateRange};

const FETCH_FAILED: &str = "Failed to fetch alerts";
const ACKNOWLEDGE_FAILED: &str = "Failed to acknowledge alert";

#[derive(Debug, Clone)]
pub enum AlertEvent {
    Fetch(Lifecycle<Vec<Alert>>),
    Acknowledge(Lifecycle<Alert>),
    SetDateRange(DateRange),
}

/// Alerts container state.
///
/// The collection sits behind an `Arc` so derived views can tell whether
/// it changed by pointer identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertsState {
    pub alerts: Arc<Vec<Alert>>,
    pub date_range: DateRange,
    pub status: OpStatus,
}

impl AlertsState {
    pub fn reduce(&mut self, event: AlertEvent) {
        match event {
            AlertEvent::Fetch(step) => {
                if let Some(alerts) = self.status.track(step, FETCH_FAILED) {
                    self.alerts = Arc::new(alerts);
                }
            }
            AlertEvent::Acknowledge(step) => {
                if let Some(alert) = self.status.track(step, ACKNOWLEDGE_FAILED) {
                    if let Some(index) = self.alerts.iter().position(|a| a.id == alert.id) {
                        Arc::make_mut(&mut self.alerts)[index] = alert;
                    }
                }
            }
            AlertEvent::SetDateRange(range) => self.date_range = range,
        }
    }
}
