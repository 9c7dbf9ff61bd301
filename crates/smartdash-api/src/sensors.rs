// Sensor telemetry endpoints

use chrono::{DateTime, SecondsFormat, Utc};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{DeviceId, ListPayload, NewReading, SensorReading, SensorType};

impl ApiClient {
    /// `GET /devices/sensor-data/{deviceId}?startDate&endDate`
    pub async fn sensor_series(
        &self,
        device_id: DeviceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SensorReading>, Error> {
        let params = [
            ("startDate", start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("endDate", end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        let page: ListPayload<SensorReading> = self
            .get_with_params(&format!("devices/sensor-data/{device_id}"), &params)
            .await?;
        Ok(page.into_vec())
    }

    /// `GET /sensor-data/latest`
    pub async fn latest_readings(&self) -> Result<Vec<SensorReading>, Error> {
        let list: ListPayload<SensorReading> = self.get("sensor-data/latest").await?;
        Ok(list.into_vec())
    }

    /// `GET /devices/sensors/{deviceId}`
    pub async fn device_sensors(&self, device_id: DeviceId) -> Result<Vec<SensorType>, Error> {
        let list: ListPayload<SensorType> =
            self.get(&format!("devices/sensors/{device_id}")).await?;
        Ok(list.into_vec())
    }

    /// `POST /devices/sensor-data/{deviceId}`
    pub async fn add_reading(
        &self,
        device_id: DeviceId,
        reading: &NewReading,
    ) -> Result<SensorReading, Error> {
        self.post(&format!("devices/sensor-data/{device_id}"), reading)
            .await
    }
}
