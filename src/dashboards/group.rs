use log::{info, warn};

use super::error::GroupError;
use super::types::{AccessLevel, Dashboard, DashboardChartRef, DashboardPayload};
use crate::api::{ApiClient, Envelope};
use crate::charts::{ChartPayload, GridLayout};

/// Most charts a single dashboard can hold.
pub const MAX_CHARTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartGroupEntry {
    pub chart_id: String,
    pub layout: GridLayout,
    pub payload: ChartPayload,
}

/// Saved charts waiting to be turned into a dashboard, in the order they
/// were added.
#[derive(Debug, Clone, Default)]
pub struct ChartGroup {
    entries: Vec<ChartGroupEntry>,
}

impl ChartGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> usize {
        MAX_CHARTS
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_CHARTS
    }

    pub fn entries(&self) -> &[ChartGroupEntry] {
        &self.entries
    }

    pub fn chart_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.chart_id.as_str()).collect()
    }

    pub fn add(
        &mut self,
        chart_id: impl Into<String>,
        layout: GridLayout,
        payload: ChartPayload,
    ) -> Result<(), GroupError> {
        if self.is_full() {
            warn!("Max {MAX_CHARTS} charts allowed");
            return Err(GroupError::CapacityReached { max: MAX_CHARTS });
        }
        self.entries.push(ChartGroupEntry {
            chart_id: chart_id.into(),
            layout,
            payload,
        });
        Ok(())
    }

    /// Unknown ids are ignored.
    pub fn remove(&mut self, chart_id: &str) {
        self.entries.retain(|e| e.chart_id != chart_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_dashboard_payload(
        &self,
        name: &str,
        access_level: Option<AccessLevel>,
        shared_with: Vec<String>,
    ) -> Result<DashboardPayload, GroupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("Dashboard name is required"));
        }
        if self.entries.is_empty() {
            return Err(invalid("Add at least one chart to the group"));
        }
        let Some(access_level) = access_level else {
            return Err(invalid("Access level is required"));
        };
        let shared_with: Vec<String> = shared_with
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if access_level == AccessLevel::Shared && shared_with.is_empty() {
            return Err(invalid("Select at least one user to share with"));
        }

        Ok(DashboardPayload {
            name: name.to_string(),
            charts: self
                .entries
                .iter()
                .map(|e| DashboardChartRef {
                    chart_id: e.chart_id.clone(),
                    layout: e.layout,
                })
                .collect(),
            access_level,
            shared_with,
        })
    }

    /// Posts the group as a new dashboard. The group is emptied only once the
    /// server has accepted it.
    pub async fn save_dashboard(
        &mut self,
        client: &ApiClient,
        name: &str,
        access_level: Option<AccessLevel>,
        shared_with: Vec<String>,
    ) -> Result<Dashboard, GroupError> {
        let payload = self.to_dashboard_payload(name, access_level, shared_with)?;

        let res: Envelope<Dashboard> = client
            .post("/api/dashboard/save", &payload)
            .await
            .map_err(|e| GroupError::from_api(e, "Failed to save dashboard"))?;

        info!(
            "Saved dashboard '{}' with {} charts",
            payload.name,
            payload.charts.len()
        );
        self.clear();
        Ok(res.data)
    }
}

fn invalid(message: &str) -> GroupError {
    warn!("Dashboard not submittable: {message}");
    GroupError::Validation(message.to_string())
}
