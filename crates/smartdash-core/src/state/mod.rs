// ── State containers ──
//
// Each container is a plain record with a pure transition function.
// Network-backed events arrive as `Lifecycle` values: pending, then
// exactly one of fulfilled or rejected.

pub mod alerts;
pub mod auth;
pub mod devices;
pub mod notifications;
pub mod sensors;
pub mod theme;

use serde::Serialize;

use crate::error::CoreError;

pub use alerts::{AlertEvent, AlertsState};
pub use auth::{AuthEvent, AuthState, SessionEffect};
pub use devices::{DeviceEvent, DevicesState};
pub use notifications::{NotificationEvent, NotificationsState};
pub use sensors::{DeviceSensors, SensorEvent, SensorsState};
pub use theme::{Palette, ThemeEvent, ThemeState};

// ── Request lifecycle ───────────────────────────────────────────────

/// One observable step of a network-backed operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Pending,
    Fulfilled(T),
    Rejected(Rejection),
}

/// Failure payload handed to a `rejected` transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejection {
    /// The server's `message`, when its failure payload carried one.
    pub message: Option<String>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The payload message, or the family's generic fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| fallback.to_owned())
    }
}

impl From<&CoreError> for Rejection {
    fn from(err: &CoreError) -> Self {
        Self {
            message: err.payload_message().map(str::to_owned),
        }
    }
}

/// `loading`/`error` pair of one operation family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl OpStatus {
    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.loading = false;
    }

    pub fn fail(&mut self, rejection: &Rejection, fallback: &str) {
        self.loading = false;
        self.error = Some(rejection.message_or(fallback));
    }

    /// Apply the bookkeeping half of a lifecycle step; returns the payload
    /// of a fulfilled step for the caller to merge.
    pub fn track<T>(&mut self, step: Lifecycle<T>, fallback: &str) -> Option<T> {
        match step {
            Lifecycle::Pending => {
                self.begin();
                None
            }
            Lifecycle::Fulfilled(payload) => {
                self.succeed();
                Some(payload)
            }
            Lifecycle::Rejected(rejection) => {
                self.fail(&rejection, fallback);
                None
            }
        }
    }
}

// ── Actions ─────────────────────────────────────────────────────────

/// Any event, routed to the container that owns it.
#[derive(Debug, Clone)]
pub enum Action {
    Auth(AuthEvent),
    Devices(DeviceEvent),
    Sensors(SensorEvent),
    Alerts(AlertEvent),
    Notifications(NotificationEvent),
    Theme(ThemeEvent),
}

macro_rules! route {
    ($($event:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$event> for Action {
            fn from(event: $event) -> Self {
                Self::$variant(event)
            }
        })+
    };
}

route! {
    AuthEvent => Auth,
    DeviceEvent => Devices,
    SensorEvent => Sensors,
    AlertEvent => Alerts,
    NotificationEvent => Notifications,
    ThemeEvent => Theme,
}
