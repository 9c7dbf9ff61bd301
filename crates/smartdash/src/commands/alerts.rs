//! Alert command handlers.

use tabled::Tabled;

use smartdash_core::selectors;
use smartdash_core::{Alert, AlertFilter, AlertId, Dashboard, DeviceId};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Ack")]
    acknowledged: String,
}

fn device_label(a: &Alert) -> String {
    match (&a.device_name, a.device_id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => id.to_string(),
        (None, None) => "-".into(),
    }
}

fn row(a: &Alert, color: bool) -> AlertRow {
    AlertRow {
        id: a.id.to_string(),
        time: output::format_time(a.created_at),
        severity: output::paint_severity(a.severity, color),
        device: device_label(a),
        message: a.message.clone(),
        acknowledged: if a.acknowledged { "yes" } else { "no" }.into(),
    }
}

fn detail(a: &Alert) -> String {
    let mut lines = vec![
        format!("ID:          {}", a.id),
        format!("Severity:    {}", a.severity),
        format!("Device:      {}", device_label(a)),
        format!("Type:        {}", output::or_dash(a.alert_type.as_deref())),
        format!("Message:     {}", a.message),
        format!("Raised:      {}", output::format_time(a.created_at)),
    ];
    if a.acknowledged {
        lines.push(format!(
            "Acked by:    {}",
            output::or_dash(a.acknowledged_by.as_deref())
        ));
        lines.push(format!(
            "Acked at:    {}",
            output::format_time(a.acknowledged_at)
        ));
    }
    lines.join("\n")
}

fn render_alerts(alerts: &[Alert], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(&global.output, alerts, |a| row(a, color), |a| {
        a.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlertsCommand::List {
            severity,
            status,
            device,
            range,
        } => {
            let filter = AlertFilter {
                severity,
                status,
                device_id: device.map(DeviceId),
                date_range: range,
            };
            let alerts = dashboard.fetch_alerts(&filter).await?;
            // The backend may ignore some query parameters.
            let shown: Vec<Alert> = selectors::filter_alerts(&alerts, &filter)
                .into_iter()
                .cloned()
                .collect();
            render_alerts(&shown, global)
        }

        AlertsCommand::Unread => {
            dashboard.fetch_alerts(&AlertFilter::default()).await?;
            let unread = dashboard
                .store()
                .with_alerts(selectors::select_unread_alerts);
            render_alerts(&unread, global)
        }

        AlertsCommand::Acknowledge { id } => {
            let alert = dashboard.acknowledge_alert(AlertId(id)).await?;
            output::notice(&format!("Alert {} acknowledged", alert.id), global.quiet);
            let out = output::render_single(&global.output, &alert, detail, |a| a.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
