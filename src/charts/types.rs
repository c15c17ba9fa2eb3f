use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::payload::UNKNOWN_CATEGORY;
use crate::shared::values::{coerce_number, display_value};

/// Series colors, assigned by position as `PALETTE[i % PALETTE.len()]`.
pub const PALETTE: [&str; 5] = ["#000", "#333", "#666", "#999", "#ccc"];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Mixed,
}

impl ChartType {
    pub fn is_pie(self) -> bool {
        self == Self::Pie
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
            Self::Mixed => "mixed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bar" => Ok(Self::Bar),
            "line" => Ok(Self::Line),
            "pie" => Ok(Self::Pie),
            "mixed" => Ok(Self::Mixed),
            _ => Err(format!("Unknown chart type: {s}")),
        }
    }
}

/// Per-series drawing style. `Pie` is only ever emitted for pie charts.
/// Styles this client does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    #[default]
    Bar,
    Line,
    Area,
    Pie,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeriesSpec {
    pub value_column: String,
    pub name: String,
    pub series_type: SeriesType,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PieSeriesSpec {
    pub label_column: String,
    pub value_column: String,
    pub name: String,
}

/// Type-specific half of a chart. Exactly one variant is ever populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartShape {
    Cartesian {
        x_axis: Option<String>,
        series: Vec<SeriesSpec>,
        stacked: bool,
    },
    Pie {
        series: Vec<PieSeriesSpec>,
    },
}

impl ChartShape {
    /// Fresh shape for `chart_type`: one empty series, nothing selected.
    pub fn empty(chart_type: ChartType) -> Self {
        if chart_type.is_pie() {
            Self::Pie {
                series: vec![PieSeriesSpec::default()],
            }
        } else {
            Self::Cartesian {
                x_axis: None,
                series: vec![SeriesSpec::default()],
                stacked: false,
            }
        }
    }

    pub fn series_len(&self) -> usize {
        match self {
            Self::Cartesian { series, .. } => series.len(),
            Self::Pie { series } => series.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub(crate) title: String,
    pub(crate) chart_type: ChartType,
    pub(crate) shape: ChartShape,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self::new(ChartType::Bar)
    }
}

impl ChartSpec {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            title: String::new(),
            chart_type,
            shape: ChartShape::empty(chart_type),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chart_type(&self) -> ChartType {
        self.chart_type
    }

    pub fn shape(&self) -> &ChartShape {
        &self.shape
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesField {
    Name(String),
    ValueColumn(String),
    LabelColumn(String),
    Kind(SeriesType),
}

/// Grid placement of a chart on a dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GridLayout {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "w")]
    pub width: u32,
    #[serde(rename = "h")]
    pub height: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 6,
            height: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    #[serde(default)]
    pub x_axis_label: String,
    #[serde(default)]
    pub y_axis_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_axis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<bool>,
    #[serde(default)]
    pub show_legend: bool,
    #[serde(default)]
    pub show_grid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub series_type: SeriesType,
    #[serde(default)]
    pub color: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
}

fn default_y_axis() -> String {
    "default".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataValue {
    pub key: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: f64,
}

/// One category of a chart. Stored charts may carry numeric or boolean
/// labels; they are read back in their display form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    #[serde(default = "unknown_label", deserialize_with = "lenient_label")]
    pub label: String,
    #[serde(default)]
    pub values: Vec<DataValue>,
}

fn unknown_label() -> String {
    UNKNOWN_CATEGORY.to_string()
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(display_value(value.as_ref()).unwrap_or_else(unknown_label))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_number(value.as_ref()))
}

impl DataPoint {
    pub fn value_for(&self, key: &str) -> Option<f64> {
        self.values.iter().find(|v| v.key == key).map(|v| v.value)
    }
}

/// Body of `POST /api/charts/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub query_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub config: ChartConfig,
    pub series: Vec<SeriesEntry>,
    pub data: Vec<DataPoint>,
    pub layout: GridLayout,
}

impl ChartPayload {
    pub fn categories(&self) -> Vec<&str> {
        self.data.iter().map(|d| d.label.as_str()).collect()
    }
}
