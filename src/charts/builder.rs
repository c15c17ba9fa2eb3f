use log::{info, warn};
use serde_json::Value;

use super::error::ChartError;
use super::payload::{build_payload, ChartContext};
use super::types::{
    ChartPayload, ChartShape, ChartSpec, ChartType, PieSeriesSpec, SeriesField, SeriesSpec,
    SeriesType,
};
use crate::api::ApiClient;
use crate::dashboards::group::ChartGroup;
use crate::shared::Row;

/// Editable chart definition. Type changes wipe every type-specific field, so
/// a chart never holds pie and cartesian settings at the same time.
#[derive(Debug, Clone, Default)]
pub struct ChartBuilder {
    spec: ChartSpec,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.spec.title = title.into();
    }

    pub fn set_type(&mut self, chart_type: ChartType) {
        self.spec.chart_type = chart_type;
        self.spec.shape = ChartShape::empty(chart_type);
    }

    pub fn set_x_axis(&mut self, column: impl Into<String>) -> Result<(), ChartError> {
        match &mut self.spec.shape {
            ChartShape::Cartesian { x_axis, .. } => {
                let column = column.into();
                *x_axis = (!column.is_empty()).then_some(column);
                Ok(())
            }
            ChartShape::Pie { .. } => Err(ChartError::FieldNotApplicable(
                "Pie charts have no x-axis".to_string(),
            )),
        }
    }

    pub fn set_stacked(&mut self, value: bool) -> Result<(), ChartError> {
        match &mut self.spec.shape {
            ChartShape::Cartesian { stacked, .. } => {
                *stacked = value;
                Ok(())
            }
            ChartShape::Pie { .. } => Err(ChartError::FieldNotApplicable(
                "Pie charts cannot be stacked".to_string(),
            )),
        }
    }

    pub fn add_series(&mut self) -> usize {
        match &mut self.spec.shape {
            ChartShape::Cartesian { series, .. } => {
                series.push(SeriesSpec {
                    name: format!("Series {}", series.len() + 1),
                    ..SeriesSpec::default()
                });
                series.len() - 1
            }
            ChartShape::Pie { series } => {
                series.push(PieSeriesSpec {
                    name: format!("Pie {}", series.len() + 1),
                    ..PieSeriesSpec::default()
                });
                series.len() - 1
            }
        }
    }

    /// Out-of-range indexes are ignored. Removing the last series is allowed;
    /// [`validate`](Self::validate) rejects a chart without any.
    pub fn remove_series(&mut self, index: usize) {
        match &mut self.spec.shape {
            ChartShape::Cartesian { series, .. } if index < series.len() => {
                series.remove(index);
            }
            ChartShape::Pie { series } if index < series.len() => {
                series.remove(index);
            }
            _ => {}
        }
    }

    pub fn update_series(&mut self, index: usize, field: SeriesField) -> Result<(), ChartError> {
        match &mut self.spec.shape {
            ChartShape::Cartesian { series, .. } => {
                let Some(s) = series.get_mut(index) else {
                    return Ok(());
                };
                match field {
                    SeriesField::Name(name) => s.name = name,
                    SeriesField::ValueColumn(column) => s.value_column = column,
                    SeriesField::Kind(SeriesType::Pie) => {
                        return Err(ChartError::FieldNotApplicable(
                            "Pie series require a pie chart".to_string(),
                        ))
                    }
                    SeriesField::Kind(SeriesType::Unknown) => {
                        return Err(ChartError::FieldNotApplicable(
                            "Unknown series type".to_string(),
                        ))
                    }
                    SeriesField::Kind(kind) => s.series_type = kind,
                    SeriesField::LabelColumn(_) => {
                        return Err(ChartError::FieldNotApplicable(
                            "Label columns only apply to pie charts".to_string(),
                        ))
                    }
                }
            }
            ChartShape::Pie { series } => {
                let Some(s) = series.get_mut(index) else {
                    return Ok(());
                };
                match field {
                    SeriesField::Name(name) => s.name = name,
                    SeriesField::ValueColumn(column) => s.value_column = column,
                    SeriesField::LabelColumn(column) => s.label_column = column,
                    SeriesField::Kind(_) => {
                        return Err(ChartError::FieldNotApplicable(
                            "Pie series have no drawing style".to_string(),
                        ))
                    }
                }
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        let result = check(&self.spec);
        if let Err(e) = &result {
            warn!("Chart not submittable: {e}");
        }
        result
    }

    pub fn build_payload(&self, rows: &[Row], ctx: &ChartContext) -> Result<ChartPayload, ChartError> {
        self.validate()?;
        Ok(build_payload(&self.spec, rows, ctx))
    }

    pub fn reset(&mut self) {
        self.spec = ChartSpec::default();
    }

    /// Persists the chart and returns the server-assigned id with the
    /// payload that was sent.
    pub async fn save(
        &self,
        client: &ApiClient,
        ctx: &ChartContext,
        rows: &[Row],
    ) -> Result<(String, ChartPayload), ChartError> {
        let mut ctx = ctx.clone();
        if ctx.created_by.is_none() {
            ctx.created_by = client.session().current_user().map(|u| u.id);
        }
        let payload = self.build_payload(rows, &ctx)?;

        let res: Value = client
            .post("/api/charts/create", &payload)
            .await
            .map_err(|e| ChartError::from_api(e, "Failed to save chart"))?;

        let chart_id = chart_id_from(&res)
            .ok_or_else(|| ChartError::Request("Failed to save chart".to_string()))?;
        info!("Saved chart '{}' as {chart_id}", payload.title);
        Ok((chart_id, payload))
    }

    /// Saves the chart and appends it to `group`, then starts over with a
    /// blank chart. A full group is rejected before anything is sent.
    pub async fn save_to_group(
        &mut self,
        client: &ApiClient,
        group: &mut ChartGroup,
        ctx: &ChartContext,
        rows: &[Row],
    ) -> Result<String, ChartError> {
        self.validate()?;
        if group.is_full() {
            warn!("Max {} charts allowed", group.capacity());
            return Err(ChartError::GroupFull(group.capacity()));
        }

        let (chart_id, payload) = self.save(client, ctx, rows).await?;
        let layout = payload.layout;
        group
            .add(chart_id.clone(), layout, payload)
            .map_err(|_| ChartError::GroupFull(group.capacity()))?;
        self.reset();
        Ok(chart_id)
    }
}

fn check(spec: &ChartSpec) -> Result<(), ChartError> {
    if spec.title.trim().is_empty() {
        return Err(ChartError::Validation("Chart title is required".to_string()));
    }
    match &spec.shape {
        ChartShape::Cartesian { x_axis, series, .. } => {
            if x_axis.as_deref().map_or(true, str::is_empty) {
                return Err(ChartError::Validation("X-axis is required".to_string()));
            }
            if series.is_empty() {
                return Err(ChartError::Validation(
                    "At least one series is required".to_string(),
                ));
            }
            if series.iter().any(|s| s.value_column.is_empty()) {
                return Err(ChartError::Validation(
                    "All Y fields must be selected".to_string(),
                ));
            }
        }
        ChartShape::Pie { series } => {
            if series.is_empty() {
                return Err(ChartError::Validation(
                    "At least one pie series is required".to_string(),
                ));
            }
            if series
                .iter()
                .any(|s| s.label_column.is_empty() || s.value_column.is_empty())
            {
                return Err(ChartError::Validation(
                    "All pie series must have label and value fields".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn chart_id_from(res: &Value) -> Option<String> {
    [res.pointer("/data/_id"), res.get("chartId"), res.pointer("/data/chartId")]
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}
