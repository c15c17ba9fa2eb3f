use std::collections::{BTreeSet, HashMap};

use super::types::{
    palette_color, ChartConfig, ChartPayload, ChartShape, ChartSpec, DataPoint, DataValue,
    GridLayout, PieSeriesSpec, SeriesEntry, SeriesSpec, SeriesType,
};
use crate::shared::values::{coerce_number, display_value, parse_number};
use crate::shared::Row;

/// Category used for rows whose x-axis cell is missing or null.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartContext {
    pub query_id: String,
    pub created_by: Option<String>,
    pub layout: GridLayout,
}

impl ChartContext {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            ..Self::default()
        }
    }

    pub fn created_by(mut self, user_id: impl Into<String>) -> Self {
        self.created_by = Some(user_id.into());
        self
    }
}

/// Shapes `spec` and the cached query rows into the chart-save body.
///
/// Cartesian charts get one data point per distinct x value, sorted
/// ascending by its string form. Each point takes its values from the first
/// row carrying that x value; rows are not aggregated. Pie charts get one
/// data point per row, skipping rows with a blank label or a non-numeric
/// value.
pub fn build_payload(spec: &ChartSpec, rows: &[Row], ctx: &ChartContext) -> ChartPayload {
    let (config, series, data) = match spec.shape() {
        ChartShape::Cartesian {
            x_axis,
            series,
            stacked,
        } => {
            let x_axis = x_axis.as_deref().unwrap_or_default();
            let config = ChartConfig {
                x_axis_label: x_axis.to_string(),
                y_axis_label: "Value".to_string(),
                multiple_axis: Some(false),
                stack: Some(*stacked),
                show_legend: true,
                show_grid: true,
            };
            let entries = series
                .iter()
                .enumerate()
                .map(|(i, s)| SeriesEntry {
                    name: series_name(s),
                    series_type: s.series_type,
                    color: palette_color(i).to_string(),
                    y_axis: "default".to_string(),
                })
                .collect();
            (config, entries, cartesian_data(x_axis, series, rows))
        }
        ChartShape::Pie { series } => {
            let first = series.first();
            let config = ChartConfig {
                x_axis_label: first.map(|s| s.label_column.clone()).unwrap_or_default(),
                y_axis_label: first.map(|s| s.value_column.clone()).unwrap_or_default(),
                multiple_axis: None,
                stack: None,
                show_legend: true,
                show_grid: true,
            };
            let entries = series
                .iter()
                .enumerate()
                .map(|(i, s)| SeriesEntry {
                    name: pie_series_name(s),
                    series_type: SeriesType::Pie,
                    color: palette_color(i).to_string(),
                    y_axis: "default".to_string(),
                })
                .collect();
            (config, entries, pie_data(series, rows))
        }
    };

    ChartPayload {
        title: spec.title().trim().to_string(),
        chart_type: spec.chart_type(),
        query_id: ctx.query_id.clone(),
        created_by: ctx.created_by.clone(),
        config,
        series,
        data,
        layout: ctx.layout,
    }
}

/// x-axis category of a row. A missing cell sorts with the `"Unknown"` label
/// but never merges with a real `"Unknown"` value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct CategoryKey {
    label: String,
    missing: bool,
}

impl CategoryKey {
    fn of(row: &Row, x_axis: &str) -> Self {
        match display_value(row.get(x_axis)) {
            Some(label) => Self {
                label,
                missing: false,
            },
            None => Self {
                label: UNKNOWN_CATEGORY.to_string(),
                missing: true,
            },
        }
    }
}

/// Distinct categories in ascending label order.
fn sorted_keys(rows: &[Row], x_axis: &str) -> BTreeSet<CategoryKey> {
    rows.iter().map(|row| CategoryKey::of(row, x_axis)).collect()
}

fn cartesian_data(x_axis: &str, series: &[SeriesSpec], rows: &[Row]) -> Vec<DataPoint> {
    if x_axis.is_empty() {
        return Vec::new();
    }

    let mut first_match: HashMap<CategoryKey, &Row> = HashMap::new();
    for row in rows {
        first_match.entry(CategoryKey::of(row, x_axis)).or_insert(row);
    }

    sorted_keys(rows, x_axis)
        .into_iter()
        .map(|key| {
            let row = first_match.get(&key).copied();
            let values = series
                .iter()
                .map(|s| DataValue {
                    key: series_name(s),
                    value: row.map_or(0.0, |r| coerce_number(r.get(&s.value_column))),
                })
                .collect();
            DataPoint {
                label: key.label,
                values,
            }
        })
        .collect()
}

fn pie_data(series: &[PieSeriesSpec], rows: &[Row]) -> Vec<DataPoint> {
    let Some(label_column) = series.first().map(|s| s.label_column.as_str()) else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let label = display_value(row.get(label_column))
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())?;
            let values = series
                .iter()
                .map(|s| {
                    parse_number(row.get(&s.value_column)).map(|value| DataValue {
                        key: pie_series_name(s),
                        value,
                    })
                })
                .collect::<Option<Vec<_>>>()?;
            Some(DataPoint { label, values })
        })
        .collect()
}

fn series_name(series: &SeriesSpec) -> String {
    non_blank_or(&series.name, &series.value_column)
}

fn pie_series_name(series: &PieSeriesSpec) -> String {
    non_blank_or(&series.name, &series.value_column)
}

fn non_blank_or(name: &str, fallback: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}
