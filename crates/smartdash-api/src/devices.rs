// Device CRUD endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Device, DeviceDraft, DeviceId, ListPayload};

impl ApiClient {
    /// `GET /devices/getAllDevices`
    pub async fn list_devices(&self) -> Result<Vec<Device>, Error> {
        let page: ListPayload<Device> = self.get("devices/getAllDevices").await?;
        Ok(page.into_vec())
    }

    /// `GET /devices/getDeviceById/{id}`
    pub async fn get_device(&self, id: DeviceId) -> Result<Device, Error> {
        self.get(&format!("devices/getDeviceById/{id}")).await
    }

    /// `POST /devices/createDevice`
    pub async fn create_device(&self, draft: &DeviceDraft) -> Result<Device, Error> {
        self.post("devices/createDevice", draft).await
    }

    /// `PUT /devices/updateDevice/{id}`
    pub async fn update_device(&self, id: DeviceId, draft: &DeviceDraft) -> Result<Device, Error> {
        self.put(&format!("devices/updateDevice/{id}"), draft).await
    }

    /// `DELETE /devices/deleteDevice/{id}`
    ///
    /// Returns the id that was removed.
    pub async fn delete_device(&self, id: DeviceId) -> Result<DeviceId, Error> {
        self.delete(&format!("devices/deleteDevice/{id}")).await?;
        Ok(id)
    }
}
