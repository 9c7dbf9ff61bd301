//! Sensor command handlers.

use tabled::Tabled;

use smartdash_core::selectors;
use smartdash_core::{Dashboard, DateRange, DeviceId, SensorReading, SensorType};

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Sensor")]
    sensor: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&SensorReading> for ReadingRow {
    fn from(r: &SensorReading) -> Self {
        let value = match r.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{:.2} {unit}", r.value),
            _ => format!("{:.2}", r.value),
        };
        Self {
            device: r.device_id.to_string(),
            sensor: r.sensor_type.to_string(),
            value,
            time: output::format_time(r.timestamp),
        }
    }
}

#[derive(Tabled)]
struct SensorTypeRow {
    #[tabled(rename = "Sensor")]
    sensor: String,
}

fn render_readings(readings: &[SensorReading], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, readings, |r| ReadingRow::from(r), |r| {
        format!("{}\t{}\t{}", r.device_id, r.sensor_type, r.value)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SensorsCommand::Data {
            device,
            sensor_type,
            days,
        } => {
            if days <= 0 {
                return Err(CliError::Validation {
                    field: "days".into(),
                    reason: "must be at least 1".into(),
                });
            }
            let device_id = DeviceId(device);
            dashboard.select_device(Some(device_id));
            dashboard.select_sensor_type(sensor_type);
            dashboard.set_sensor_date_range(DateRange::last_days(days));

            let series = dashboard.fetch_sensor_data(device_id, None).await?;
            let shown = if sensor_type.is_some() {
                dashboard
                    .store()
                    .with_sensors(selectors::select_current_sensor_data)
            } else {
                series
            };
            render_readings(&shown, global)
        }

        SensorsCommand::Latest { sensor_type } => {
            let latest = dashboard.fetch_latest_readings().await?;
            let shown: Vec<SensorReading> = match sensor_type {
                Some(kind) => selectors::latest_by_type(&latest, kind)
                    .into_iter()
                    .cloned()
                    .collect(),
                None => latest,
            };
            render_readings(&shown, global)
        }

        SensorsCommand::List { device } => {
            let sensors: Vec<SensorType> = dashboard.fetch_device_sensors(DeviceId(device)).await?;
            let out = output::render_list(
                &global.output,
                &sensors,
                |s| SensorTypeRow {
                    sensor: s.to_string(),
                },
                ToString::to_string,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SensorsCommand::Add {
            device,
            sensor_type,
            value,
        } => {
            let reading = dashboard
                .add_sensor_reading(DeviceId(device), sensor_type, value)
                .await?;
            output::notice(
                &format!("Recorded {} on device {}", reading.sensor_type, reading.device_id),
                global.quiet,
            );
            render_readings(std::slice::from_ref(&reading), global)
        }
    }
}
