// ── Runtime dashboard configuration ──
//
// Describes where the backend lives and how often the background polls
// run. The CLI builds this from smartdash-config; core never reads files.

use std::time::Duration;

use smartdash_api::TlsMode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);

/// Configuration for a [`Dashboard`](crate::Dashboard).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL including the `/api/v1` prefix.
    pub base_url: String,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Period of the silent token re-validation. Zero disables it.
    pub auth_check_interval: Duration,
    /// Period of the overview refresh (latest readings + open alerts).
    /// Zero disables it.
    pub refresh_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            auth_check_interval: DEFAULT_POLL_INTERVAL,
            refresh_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
