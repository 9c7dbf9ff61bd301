// ── Reactive state store ──
//
// One `watch` channel per container. Every transition runs inside
// `send_modify`, so each is atomic with respect to the others and
// subscribers see whole states only.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::session::SessionStore;
use crate::state::{
    Action, AlertsState, AuthState, DevicesState, NotificationsState, SensorsState, ThemeState,
};

/// Owner of every container and of the durable session.
pub struct Store {
    session: Arc<dyn SessionStore>,
    auth: watch::Sender<AuthState>,
    devices: watch::Sender<DevicesState>,
    sensors: watch::Sender<SensorsState>,
    alerts: watch::Sender<AlertsState>,
    notifications: watch::Sender<NotificationsState>,
    theme: watch::Sender<ThemeState>,
}

impl Store {
    /// Build the containers, seeding auth from the durable session.
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        let (auth, _) = watch::channel(AuthState::restore(session.as_ref()));
        let (devices, _) = watch::channel(DevicesState::default());
        let (sensors, _) = watch::channel(SensorsState::default());
        let (alerts, _) = watch::channel(AlertsState::default());
        let (notifications, _) = watch::channel(NotificationsState::default());
        let (theme, _) = watch::channel(ThemeState::default());

        Self {
            session,
            auth,
            devices,
            sensors,
            alerts,
            notifications,
            theme,
        }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Apply one event to the container that owns it.
    pub fn dispatch(&self, action: impl Into<Action>) {
        let action = action.into();
        trace!(?action, "dispatch");

        match action {
            Action::Auth(event) => {
                let mut effect = None;
                self.auth.send_modify(|state| effect = state.reduce(event));
                if let Some(effect) = effect {
                    effect.apply(self.session.as_ref());
                }
            }
            Action::Devices(event) => self.devices.send_modify(|state| state.reduce(event)),
            Action::Sensors(event) => self.sensors.send_modify(|state| state.reduce(event)),
            Action::Alerts(event) => self.alerts.send_modify(|state| state.reduce(event)),
            Action::Notifications(event) => {
                self.notifications.send_modify(|state| state.reduce(event));
            }
            Action::Theme(event) => self.theme.send_modify(|state| state.reduce(event)),
        }
    }

    // ── Snapshots ────────────────────────────────────────────────────

    pub fn auth(&self) -> AuthState {
        self.auth.borrow().clone()
    }

    pub fn devices(&self) -> DevicesState {
        self.devices.borrow().clone()
    }

    pub fn sensors(&self) -> SensorsState {
        self.sensors.borrow().clone()
    }

    pub fn alerts(&self) -> AlertsState {
        self.alerts.borrow().clone()
    }

    pub fn notifications(&self) -> NotificationsState {
        *self.notifications.borrow()
    }

    pub fn theme(&self) -> ThemeState {
        *self.theme.borrow()
    }

    /// Read a container without cloning it.
    pub fn with_sensors<R>(&self, f: impl FnOnce(&SensorsState) -> R) -> R {
        f(&self.sensors.borrow())
    }

    pub fn with_alerts<R>(&self, f: impl FnOnce(&AlertsState) -> R) -> R {
        f(&self.alerts.borrow())
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_auth(&self) -> StateStream<AuthState> {
        StateStream::new(self.auth.subscribe())
    }

    pub fn subscribe_devices(&self) -> StateStream<DevicesState> {
        StateStream::new(self.devices.subscribe())
    }

    pub fn subscribe_sensors(&self) -> StateStream<SensorsState> {
        StateStream::new(self.sensors.subscribe())
    }

    pub fn subscribe_alerts(&self) -> StateStream<AlertsState> {
        StateStream::new(self.alerts.subscribe())
    }

    pub fn subscribe_notifications(&self) -> StateStream<NotificationsState> {
        StateStream::new(self.notifications.subscribe())
    }

    pub fn subscribe_theme(&self) -> StateStream<ThemeState> {
        StateStream::new(self.theme.subscribe())
    }
}

// ── StateStream ─────────────────────────────────────────────────────

/// Subscription to one container.
///
/// Offers the snapshot taken at subscription time, the latest snapshot,
/// change notification, and conversion into a `Stream`.
pub struct StateStream<T: Clone + Send + Sync + 'static> {
    current: T,
    receiver: watch::Receiver<T>,
}

impl<T: Clone + Send + Sync + 'static> StateStream<T> {
    fn new(mut receiver: watch::Receiver<T>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Wait for the next transition. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until the state satisfies `predicate`.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let snap = self.receiver.wait_for(predicate).await.ok()?.clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Transitions after `current()`, as a `Stream`.
    pub fn into_stream(self) -> StateWatchStream<T> {
        StateWatchStream {
            inner: WatchStream::from_changes(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per transition.
pub struct StateWatchStream<T: Clone + Send + Sync + 'static> {
    inner: WatchStream<T>,
}

impl<T: Clone + Send + Sync + 'static> Stream for StateWatchStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
