//! State layer between `smartdash-api` and UI consumers (CLI, dashboards).
//!
//! - **[`Dashboard`]**: Facade owning the HTTP gateway, the container
//!   [`Store`] and the durable session. Every network intent runs through
//!   the [`orchestrator`], so the owning container observes `pending`, then
//!   exactly one of `fulfilled` or `rejected`.
//!   [`start_polling()`](Dashboard::start_polling) spawns the periodic auth
//!   re-check and overview refresh, returning a [`PollGuard`].
//!
//! - **[`Store`]**: Six containers (auth, devices, sensors, alerts,
//!   notifications, theme), each behind a `tokio::sync::watch` channel.
//!   Transitions are pure functions in [`state`]; subscribers get
//!   [`StateStream`] handles.
//!
//! - **[`session`]**: Durable `token` / `userId` storage. The gateway
//!   reads credentials from it at request time.
//!
//! - **[`selectors`]**: Derived read-only views (current series, unread
//!   alerts, device summaries, map markers).

pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod selectors;
pub mod session;
pub mod state;
pub mod store;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::DashboardConfig;
pub use smartdash_api::TlsMode;
pub use dashboard::{Dashboard, PollGuard};
pub use error::CoreError;
pub use session::{
    FileSessionStore, MemorySessionStore, SessionCredentials, SessionKey, SessionStore,
};
pub use state::{
    Action, AlertEvent, AlertsState, AuthEvent, AuthState, DeviceEvent, DevicesState, Lifecycle,
    NotificationEvent, NotificationsState, OpStatus, Palette, Rejection, SensorEvent, SensorsState,
    ThemeEvent, ThemeState,
};
pub use store::{StateStream, Store};
pub use validation::{PasswordChangeForm, Registration};

pub use model::{
    AckFilter, Alert, AlertFilter, AlertId, AlertWindow, AuthResponse, DateRange, Device,
    DeviceDraft, DeviceFilter, DeviceId, DeviceStatus, ProfileUpdate, SensorReading, SensorType,
    Severity, User,
};
