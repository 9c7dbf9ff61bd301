// ── Dashboard facade ──
//
// Owns the gateway, the container store and the durable session. Every
// network intent runs through the orchestrator so its family observes
// pending, then fulfilled or rejected. Local intents dispatch directly.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use smartdash_api::models::{NewReading, NewUser, PasswordChange};
use smartdash_api::{ApiClient, TransportConfig};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::{
    Alert, AlertFilter, AlertId, AuthResponse, DateRange, Device, DeviceDraft, DeviceId,
    ProfileUpdate, SensorReading, SensorType, User,
};
use crate::orchestrator::settle;
use crate::session::{SessionCredentials, SessionStore};
use crate::state::{
    AlertEvent, AuthEvent, DeviceEvent, DeviceSensors, NotificationEvent, SensorEvent, ThemeEvent,
};
use crate::store::Store;
use crate::validation::{self, PasswordChangeForm, Registration};

/// Entry point for UI consumers.
///
/// Cheap to clone; clones share the gateway, the store and the
/// cancellation root.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    api: ApiClient,
    store: Store,
    cancel: CancellationToken,
}

impl Dashboard {
    /// Build a dashboard whose gateway reads credentials from `session`.
    pub fn new(config: DashboardConfig, session: Arc<dyn SessionStore>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let credentials = Arc::new(SessionCredentials::new(Arc::clone(&session)));
        let api = ApiClient::new(&config.base_url, &transport, credentials)?;
        Ok(Self::with_api(config, api, session))
    }

    /// Build around an existing gateway.
    pub fn with_api(config: DashboardConfig, api: ApiClient, session: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                config,
                api,
                store: Store::new(session),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // ── Auth ─────────────────────────────────────────────────────────

    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, CoreError> {
        validation::validate_login(email, password)?;
        let email = email.trim();
        debug!(email, "login");
        settle(self.store(), AuthEvent::Login, self.api().login(email, password)).await
    }

    pub async fn register(&self, form: &Registration) -> Result<AuthResponse, CoreError> {
        validation::validate_registration(form)?;
        let body = NewUser {
            first_name: form.first_name.trim(),
            last_name: form.last_name.trim(),
            email: form.email.trim(),
            password: form.password.expose_secret(),
        };
        settle(self.store(), AuthEvent::Register, self.api().register(&body)).await
    }

    /// Silent re-validation of the held token.
    ///
    /// Never surfaces an error: a failure only drops the durable token.
    pub async fn check_auth_state(&self) -> bool {
        match settle(self.store(), AuthEvent::CheckAuthState, self.api().verify_token()).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "token re-validation failed");
                false
            }
        }
    }

    /// Fetch a profile, by default the signed-in user's.
    pub async fn fetch_user_profile(&self, user_id: Option<&str>) -> Result<User, CoreError> {
        let user_id = match user_id {
            Some(id) => id.to_owned(),
            None => self
                .store()
                .auth()
                .user_id
                .ok_or(CoreError::NotAuthenticated)?,
        };
        settle(
            self.store(),
            AuthEvent::FetchUserProfile,
            self.api().get_user(&user_id),
        )
        .await
    }

    pub async fn update_user_profile(&self, update: &ProfileUpdate) -> Result<User, CoreError> {
        validation::validate_profile_update(update)?;
        settle(
            self.store(),
            AuthEvent::UpdateUserProfile,
            self.api().update_profile(update),
        )
        .await
    }

    pub async fn change_password(&self, form: &PasswordChangeForm) -> Result<(), CoreError> {
        validation::validate_password_change(form)?;
        let body = PasswordChange {
            current_password: form.current_password.expose_secret(),
            new_password: form.new_password.expose_secret(),
            confirm_password: form.confirm_password.expose_secret(),
        };
        settle(
            self.store(),
            AuthEvent::ChangePassword,
            self.api().change_password(&body),
        )
        .await
    }

    /// Request a reset link; returns the server's confirmation text.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, CoreError> {
        validation::validate_forgot_password(email)?;
        let api = self.api();
        let email = email.trim();
        settle(self.store(), AuthEvent::ForgotPassword, async move {
            api.forgot_password(email).await.map(|reply| reply.message)
        })
        .await
    }

    pub fn logout(&self) {
        self.store().dispatch(AuthEvent::Logout);
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn fetch_devices(&self) -> Result<Vec<Device>, CoreError> {
        settle(self.store(), DeviceEvent::Fetch, self.api().list_devices()).await
    }

    /// Single-device lookup. Does not touch the devices container.
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, CoreError> {
        Ok(self.api().get_device(id).await?)
    }

    pub async fn create_device(&self, draft: &DeviceDraft) -> Result<Device, CoreError> {
        settle(self.store(), DeviceEvent::Create, self.api().create_device(draft)).await
    }

    pub async fn update_device(
        &self,
        id: DeviceId,
        draft: &DeviceDraft,
    ) -> Result<Device, CoreError> {
        settle(
            self.store(),
            DeviceEvent::Update,
            self.api().update_device(id, draft),
        )
        .await
    }

    pub async fn delete_device(&self, id: DeviceId) -> Result<DeviceId, CoreError> {
        settle(self.store(), DeviceEvent::Delete, self.api().delete_device(id)).await
    }

    // ── Sensors ──────────────────────────────────────────────────────

    pub fn select_device(&self, id: Option<DeviceId>) {
        self.store().dispatch(SensorEvent::SetCurrentDevice(id));
    }

    pub fn select_sensor_type(&self, sensor_type: Option<SensorType>) {
        self.store()
            .dispatch(SensorEvent::SetCurrentSensorType(sensor_type));
    }

    pub fn set_sensor_date_range(&self, range: DateRange) {
        self.store().dispatch(SensorEvent::SetDateRange(range));
    }

    pub fn clear_sensor_data(&self) {
        self.store().dispatch(SensorEvent::ClearSensorData);
    }

    pub fn clear_sensor_errors(&self) {
        self.store().dispatch(SensorEvent::ClearErrors);
    }

    /// Time series of one device. `None` uses the container's date range.
    pub async fn fetch_sensor_data(
        &self,
        device_id: DeviceId,
        range: Option<DateRange>,
    ) -> Result<Vec<SensorReading>, CoreError> {
        let range = range.unwrap_or_else(|| self.store().with_sensors(|s| s.date_range));
        settle(
            self.store(),
            SensorEvent::FetchSeries,
            self.api().sensor_series(device_id, range.start, range.end),
        )
        .await
    }

    pub async fn fetch_latest_readings(&self) -> Result<Vec<SensorReading>, CoreError> {
        settle(
            self.store(),
            SensorEvent::FetchLatest,
            self.api().latest_readings(),
        )
        .await
    }

    pub async fn fetch_device_sensors(
        &self,
        device_id: DeviceId,
    ) -> Result<Vec<SensorType>, CoreError> {
        let api = self.api();
        let catalog = settle(self.store(), SensorEvent::FetchDeviceSensors, async move {
            let sensors = api.device_sensors(device_id).await?;
            Ok::<_, smartdash_api::Error>(DeviceSensors { device_id, sensors })
        })
        .await?;
        Ok(catalog.sensors)
    }

    pub async fn add_sensor_reading(
        &self,
        device_id: DeviceId,
        sensor_type: SensorType,
        value: f64,
    ) -> Result<SensorReading, CoreError> {
        validation::validate_reading(value)?;
        let body = NewReading { sensor_type, value };
        settle(
            self.store(),
            SensorEvent::AddReading,
            self.api().add_reading(device_id, &body),
        )
        .await
    }

    // ── Alerts ───────────────────────────────────────────────────────

    pub async fn fetch_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, CoreError> {
        settle(self.store(), AlertEvent::Fetch, self.api().list_alerts(filter)).await
    }

    pub async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, CoreError> {
        settle(
            self.store(),
            AlertEvent::Acknowledge,
            self.api().acknowledge_alert(id),
        )
        .await
    }

    pub fn set_alert_date_range(&self, range: DateRange) {
        self.store().dispatch(AlertEvent::SetDateRange(range));
    }

    // ── Notifications & theme ────────────────────────────────────────

    pub fn mark_notifications_read(&self) {
        self.store().dispatch(NotificationEvent::MarkAllRead);
    }

    pub fn set_unread_notifications(&self, count: u32) {
        self.store().dispatch(NotificationEvent::SetUnread(count));
    }

    pub fn toggle_theme(&self) {
        self.store().dispatch(ThemeEvent::Toggle);
    }

    pub fn set_dark_mode(&self, dark: bool) {
        self.store().dispatch(ThemeEvent::Set { dark });
    }

    // ── Composite loads ──────────────────────────────────────────────

    /// Dashboard mount: latest readings, devices and open alerts,
    /// fetched concurrently. Each family settles on its own; the first
    /// error (in that order) is returned.
    pub async fn load_overview(&self) -> Result<(), CoreError> {
        let open = AlertFilter::unacknowledged();
        let (latest, devices, alerts) = tokio::join!(
            self.fetch_latest_readings(),
            self.fetch_devices(),
            self.fetch_alerts(&open),
        );
        latest?;
        devices?;
        alerts?;
        Ok(())
    }

    /// Periodic refresh: latest readings and open alerts.
    pub async fn refresh_overview(&self) -> Result<(), CoreError> {
        let open = AlertFilter::unacknowledged();
        let (latest, alerts) = tokio::join!(self.fetch_latest_readings(), self.fetch_alerts(&open));
        latest?;
        alerts?;
        Ok(())
    }

    // ── Background polling ───────────────────────────────────────────

    /// Spawn the auth re-check and overview refresh tasks.
    ///
    /// Must be called inside a Tokio runtime. A zero interval disables
    /// its task. The tasks stop when the returned guard is dropped or
    /// shut down, or when [`shutdown`](Self::shutdown) is called.
    pub fn start_polling(&self) -> PollGuard {
        let cancel = self.inner.cancel.child_token();
        let mut handles = Vec::new();

        let auth_period = self.inner.config.auth_check_interval;
        if !auth_period.is_zero() {
            handles.push(tokio::spawn(auth_check_task(
                self.clone(),
                auth_period,
                cancel.clone(),
            )));
        }

        let refresh_period = self.inner.config.refresh_interval;
        if !refresh_period.is_zero() {
            handles.push(tokio::spawn(refresh_task(
                self.clone(),
                refresh_period,
                cancel.clone(),
            )));
        }

        info!(tasks = handles.len(), "polling started");
        PollGuard { cancel, handles }
    }

    /// Cancel every task spawned from this dashboard.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }
}

// ── PollGuard ───────────────────────────────────────────────────────

/// Handle to the polling tasks. Dropping it cancels them.
pub struct PollGuard {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl PollGuard {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the tasks and wait for them to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        for handle in std::mem::take(&mut self.handles) {
            if let Err(err) = handle.await {
                warn!(error = %err, "poll task ended abnormally");
            }
        }
        debug!("polling stopped");
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background tasks ────────────────────────────────────────────────

async fn auth_check_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                dashboard.check_auth_state().await;
            }
        }
    }
}

async fn refresh_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(err) = dashboard.refresh_overview().await {
                    warn!(error = %err, "periodic refresh failed");
                }
            }
        }
    }
}
