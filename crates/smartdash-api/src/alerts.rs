// Alert endpoints

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Alert, AlertFilter, AlertId, ListPayload};

impl ApiClient {
    /// `GET /alerts/getAllAlerts?<filters>`
    pub async fn list_alerts(&self, filter: &AlertFilter) -> Result<Vec<Alert>, Error> {
        let page: ListPayload<Alert> = self
            .get_with_params("alerts/getAllAlerts", &filter.to_query())
            .await?;
        Ok(page.into_vec())
    }

    /// `PATCH /alerts/acknowledgeAlert/{alertId}`
    pub async fn acknowledge_alert(&self, id: AlertId) -> Result<Alert, Error> {
        self.patch_empty(&format!("alerts/acknowledgeAlert/{id}"))
            .await
    }
}
