//! Device command handlers.

use tabled::Tabled;

use smartdash_core::model::DeviceFilter;
use smartdash_core::selectors::{self, StatusSummary};
use smartdash_core::{Dashboard, Device, DeviceDraft, DeviceId};

use crate::cli::{DeviceFields, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    device_type: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Last Seen")]
    last_seen: String,
}

fn row(d: &Device, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        device_type: output::or_dash(d.device_type.as_deref()),
        location: output::or_dash(d.location.as_deref()),
        status: d.status.map_or_else(|| "-".into(), |s| s.to_string()),
        link: output::paint_online(d.online, color),
        last_seen: output::format_time(d.last_seen),
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:          {}", d.id),
        format!("Name:        {}", d.name),
        format!("Type:        {}", output::or_dash(d.device_type.as_deref())),
        format!("Location:    {}", output::or_dash(d.location.as_deref())),
        format!(
            "Status:      {}",
            d.status.map_or_else(|| "-".into(), |s| s.to_string())
        ),
        format!("Link:        {}", output::paint_online(d.online, false)),
        format!("Last Seen:   {}", output::format_time(d.last_seen)),
    ];
    if let (Some(lat), Some(lon)) = (d.latitude, d.longitude) {
        lines.push(format!("Position:    {lat:.5}, {lon:.5}"));
    }
    if let Some(count) = d.alerts_count {
        lines.push(format!("Alerts:      {count}"));
    }
    lines.join("\n")
}

fn summary_detail(s: &StatusSummary) -> String {
    [
        format!("Total:       {}", s.total),
        format!("Online:      {}", s.online),
        format!("Offline:     {}", s.offline),
        format!("Active:      {}", s.active),
    ]
    .join("\n")
}

fn draft(fields: DeviceFields) -> DeviceDraft {
    DeviceDraft {
        name: fields.name,
        device_type: fields.device_type,
        location: fields.location,
        status: fields.status,
    }
}

fn render_device(device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, device, detail, |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List {
            status,
            device_type,
            location,
            search,
        } => {
            let devices = dashboard.fetch_devices().await?;
            let filter = DeviceFilter {
                status,
                device_type,
                location,
                search,
            };
            let shown: Vec<Device> = selectors::filter_devices(&devices, &filter)
                .into_iter()
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &shown,
                |d| row(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = dashboard.get_device(DeviceId(id)).await?;
            render_device(&device, global)
        }

        DevicesCommand::Create(fields) => {
            let device = dashboard.create_device(&draft(fields)).await?;
            output::notice(&format!("Device {} created", device.id), global.quiet);
            render_device(&device, global)
        }

        DevicesCommand::Update { id, fields } => {
            let device = dashboard.update_device(DeviceId(id), &draft(fields)).await?;
            output::notice(&format!("Device {} updated", device.id), global.quiet);
            render_device(&device, global)
        }

        DevicesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete device {id}?"), global.yes)? {
                return Ok(());
            }
            let removed = dashboard.delete_device(DeviceId(id)).await?;
            output::notice(&format!("Device {removed} deleted"), global.quiet);
            Ok(())
        }

        DevicesCommand::Summary => {
            let devices = dashboard.fetch_devices().await?;
            let summary = selectors::device_status_summary(&devices);
            let out = output::render_single(&global.output, &summary, summary_detail, |s| {
                s.total.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
