//! Dashboard command handlers: overview, map markers and live refresh.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;
use tokio_stream::StreamExt;

use smartdash_core::selectors::{self, MapMarker, StatusSummary, UnreadAlerts};
use smartdash_core::{Alert, Dashboard, SensorReading, SessionKey, Severity};

use crate::cli::{DashboardArgs, DashboardCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Overview {
    devices: StatusSummary,
    latest: Vec<SensorReading>,
    open_alerts: Vec<Alert>,
}

/// One line of `dashboard watch`.
#[derive(Serialize)]
struct Frame {
    at: chrono::DateTime<chrono::Utc>,
    readings: usize,
    open_alerts: usize,
    critical: usize,
    signed_in: bool,
}

#[derive(Tabled)]
struct MarkerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Latitude")]
    latitude: String,
    #[tabled(rename = "Longitude")]
    longitude: String,
    #[tabled(rename = "Link")]
    link: String,
}

fn spinner(message: &'static str, global: &GlobalOpts) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

fn overview_detail(o: &Overview, color: bool) -> String {
    let mut lines = vec![
        format!(
            "Devices:     {} total, {} online, {} offline, {} active",
            o.devices.total, o.devices.online, o.devices.offline, o.devices.active
        ),
        String::new(),
        format!("Latest readings ({})", o.latest.len()),
    ];
    for r in &o.latest {
        let unit = r.unit.as_deref().unwrap_or("");
        lines.push(format!(
            "  device {:<6} {:<16} {:>10.2} {unit}",
            r.device_id.to_string(),
            r.sensor_type.to_string(),
            r.value
        ));
    }
    lines.push(String::new());
    lines.push(format!("Open alerts ({})", o.open_alerts.len()));
    for a in &o.open_alerts {
        lines.push(format!(
            "  #{:<6} {:<10} {}",
            a.id.to_string(),
            output::paint_severity(a.severity, color),
            a.message
        ));
    }
    lines.join("\n")
}

fn frame_line(f: &Frame) -> String {
    let mut line = format!(
        "[{}] {} readings, {} open alerts ({} critical)",
        f.at.format("%H:%M:%S"),
        f.readings,
        f.open_alerts,
        f.critical
    );
    if !f.signed_in {
        line.push_str(", session expired");
    }
    line
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DashboardCommand::Overview => {
            let bar = spinner("Loading overview", global);
            let loaded = dashboard.load_overview().await;
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }
            loaded?;

            let overview = Overview {
                devices: selectors::device_status_summary(&dashboard.store().devices().devices),
                latest: dashboard
                    .store()
                    .with_sensors(|s| selectors::select_latest_readings(s).to_vec()),
                open_alerts: dashboard
                    .store()
                    .with_alerts(selectors::select_unread_alerts)
                    .to_vec(),
            };
            let out = output::render_single(
                &global.output,
                &overview,
                |o| overview_detail(o, color),
                |o| o.open_alerts.len().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DashboardCommand::Map => {
            let devices = dashboard.fetch_devices().await?;
            let markers = selectors::map_markers(&devices);
            let out = output::render_list(
                &global.output,
                &markers,
                |m: &MapMarker| MarkerRow {
                    id: m.id.to_string(),
                    name: m.name.clone(),
                    latitude: format!("{:.5}", m.latitude),
                    longitude: format!("{:.5}", m.longitude),
                    link: output::paint_online(m.online, color),
                },
                |m| format!("{}\t{}\t{}", m.id, m.latitude, m.longitude),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DashboardCommand::Watch { interval: _ } => watch(dashboard, global).await,
    }
}

/// Refresh on the configured cadence until Ctrl-C or the session expires.
async fn watch(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    if let Err(err) = dashboard.load_overview().await {
        tracing::warn!(error = %err, "initial load failed");
    }

    let mut sensors = dashboard.store().subscribe_sensors().into_stream();
    let mut alerts = dashboard.store().subscribe_alerts().into_stream();
    let mut auth = dashboard.store().subscribe_auth();
    let mut unread = UnreadAlerts::default();

    let emit = |unread: &mut UnreadAlerts| -> Result<bool, CliError> {
        let open = unread.select(&dashboard.store().alerts());
        let count = u32::try_from(open.len()).unwrap_or(u32::MAX);
        dashboard.set_unread_notifications(count);
        // A failed re-check drops only the durable token.
        let signed_in = dashboard.store().session().get(SessionKey::Token).is_some();
        let frame = Frame {
            at: chrono::Utc::now(),
            readings: dashboard.store().with_sensors(|s| s.latest.len()),
            open_alerts: open.len(),
            critical: open
                .iter()
                .filter(|a| a.severity == Severity::Critical)
                .count(),
            signed_in,
        };
        let line = match global.output {
            OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(&frame)?,
            _ => frame_line(&frame),
        };
        output::print_output(&line, global.quiet);
        Ok(signed_in)
    };

    emit(&mut unread)?;
    let guard = dashboard.start_polling();

    let result = loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break Ok(()),
            state = auth.changed() => {
                let Some(state) = state else { break Ok(()) };
                if !state.status.loading && !emit(&mut unread)? {
                    break Err(CliError::AuthFailed {
                        message: "Session expired while watching".into(),
                    });
                }
            }
            state = sensors.next() => {
                let Some(state) = state else { break Ok(()) };
                if !state.latest_status.loading {
                    emit(&mut unread)?;
                }
            }
            state = alerts.next() => {
                let Some(state) = state else { break Ok(()) };
                if !state.status.loading {
                    emit(&mut unread)?;
                }
            }
        }
    };

    guard.shutdown().await;
    dashboard.mark_notifications_read();
    result
}
