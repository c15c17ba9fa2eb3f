use log::{info, warn};
use serde_json::Value;

use super::error::{DashboardError, GroupError};
use super::group::ChartGroup;
use super::types::{AccessLevel, Dashboard, UpdateDashboardRequest};
use crate::api::{ApiClient, Envelope};

/// Local copy of the user's dashboards plus the one currently open.
#[derive(Debug, Clone, Default)]
pub struct DashboardCatalog {
    list: Vec<Dashboard>,
    current: Option<Dashboard>,
}

impl DashboardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &[Dashboard] {
        &self.list
    }

    pub fn current(&self) -> Option<&Dashboard> {
        self.current.as_ref()
    }

    pub fn get(&self, id: &str) -> Option<&Dashboard> {
        self.list.iter().find(|d| d.id == id)
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn replace_all(&mut self, dashboards: Vec<Dashboard>) {
        self.list = dashboards;
    }

    pub fn insert_front(&mut self, dashboard: Dashboard) {
        self.list.insert(0, dashboard);
    }

    /// Replaces the entry with the same id, and `current` when it is that
    /// dashboard. Unknown ids leave the list alone.
    pub fn apply_update(&mut self, dashboard: Dashboard) {
        if let Some(slot) = self.list.iter_mut().find(|d| d.id == dashboard.id) {
            *slot = dashboard.clone();
        }
        if self.current.as_ref().is_some_and(|c| c.id == dashboard.id) {
            self.current = Some(dashboard);
        }
    }

    pub fn apply_delete(&mut self, id: &str) {
        self.list.retain(|d| d.id != id);
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
    }

    pub async fn fetch_all(&mut self, client: &ApiClient) -> Result<&[Dashboard], DashboardError> {
        let res: Envelope<Vec<Dashboard>> = client
            .get("/api/dashboard/list")
            .await
            .map_err(|e| DashboardError::from_api(e, "Failed to fetch dashboards"))?;

        info!("Loaded {} dashboards", res.data.len());
        self.replace_all(res.data);
        Ok(&self.list)
    }

    pub async fn fetch_one(
        &mut self,
        client: &ApiClient,
        id: &str,
    ) -> Result<&Dashboard, DashboardError> {
        let id = valid_id(id)?;
        let path = format!("/api/dashboard/{}", urlencoding::encode(id));
        let res: Envelope<Dashboard> = client
            .get(&path)
            .await
            .map_err(|e| DashboardError::from_api(e, "Failed to fetch dashboard"))?;

        Ok(self.current.insert(res.data))
    }

    /// Saves `group` as a new dashboard and puts it at the front of the list.
    pub async fn save(
        &mut self,
        client: &ApiClient,
        group: &mut ChartGroup,
        name: &str,
        access_level: Option<AccessLevel>,
        shared_with: Vec<String>,
    ) -> Result<&Dashboard, GroupError> {
        let dashboard = group
            .save_dashboard(client, name, access_level, shared_with)
            .await?;
        self.insert_front(dashboard);
        Ok(&self.list[0])
    }

    pub async fn update(
        &mut self,
        client: &ApiClient,
        id: &str,
        request: &UpdateDashboardRequest,
    ) -> Result<Dashboard, DashboardError> {
        let id = valid_id(id)?;
        let path = format!("/api/dashboard/{}", urlencoding::encode(id));
        let res: Envelope<Dashboard> = client
            .put(&path, request)
            .await
            .map_err(|e| DashboardError::from_api(e, "Failed to update dashboard"))?;

        self.apply_update(res.data.clone());
        Ok(res.data)
    }

    pub async fn delete(&mut self, client: &ApiClient, id: &str) -> Result<(), DashboardError> {
        let id = valid_id(id)?;
        let path = format!("/api/dashboard/{}", urlencoding::encode(id));
        let _: Value = client
            .delete(&path)
            .await
            .map_err(|e| DashboardError::from_api(e, "Failed to delete dashboard"))?;

        info!("Deleted dashboard {id}");
        self.apply_delete(id);
        Ok(())
    }
}

fn valid_id(id: &str) -> Result<&str, DashboardError> {
    let id = id.trim();
    if id.is_empty() || id == "undefined" || id == "null" {
        warn!("Rejected dashboard id {id:?}");
        return Err(DashboardError::Validation(
            "Invalid dashboard ID provided".to_string(),
        ));
    }
    Ok(id)
}
