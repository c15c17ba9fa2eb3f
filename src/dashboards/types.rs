use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::charts::{ChartPayload, ChartType, DataPoint, GridLayout, SeriesEntry};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    #[default]
    Private,
    Shared,
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Shared => "shared",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "shared" => Ok(Self::Shared),
            _ => Err(format!("Unknown access level: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardChartRef {
    pub chart_id: String,
    pub layout: GridLayout,
}

/// Body of `POST /api/dashboard/save`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub name: String,
    pub charts: Vec<DashboardChartRef>,
    pub access_level: AccessLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<String>,
}

/// Body of `PUT /api/dashboard/:id`. Unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDashboardRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<Vec<DashboardChartRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_with: Option<Vec<String>>,
}

/// A chart as the server returns it inside a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedChart {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub chart_type: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub series: Vec<SeriesEntry>,
    #[serde(default)]
    pub data: Vec<DataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<GridLayout>,
}

impl PersistedChart {
    /// The chart as the server stores it after a successful create.
    pub fn from_payload(id: impl Into<String>, payload: &ChartPayload) -> Self {
        Self {
            id: id.into(),
            title: payload.title.clone(),
            chart_type: payload.chart_type.to_string(),
            config: serde_json::to_value(&payload.config).unwrap_or_default(),
            series: payload.series.clone(),
            data: payload.data.clone(),
            layout: Some(payload.layout),
        }
    }

    /// `None` for types this client cannot draw.
    pub fn known_type(&self) -> Option<ChartType> {
        self.chart_type.parse().ok()
    }
}

/// `chartId` is populated with the chart document by the server; it stays a
/// bare id when the chart no longer exists. Anything else is kept as raw JSON
/// and treated as unresolved, so one unreadable chart never fails the whole
/// dashboard list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ChartRef {
    Populated(Box<PersistedChart>),
    Id(String),
    Unreadable(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardChart {
    #[serde(rename = "chartId", default)]
    pub chart_ref: Option<ChartRef>,
    #[serde(default)]
    pub layout: Option<GridLayout>,
}

impl DashboardChart {
    pub fn chart(&self) -> Option<&PersistedChart> {
        match &self.chart_ref {
            Some(ChartRef::Populated(chart)) => Some(chart),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub access_level: AccessLevel,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub charts: Vec<DashboardChart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Dashboard {
    /// Charts whose reference resolved to a chart document.
    pub fn populated_charts(&self) -> impl Iterator<Item = &PersistedChart> {
        self.charts.iter().filter_map(DashboardChart::chart)
    }
}
