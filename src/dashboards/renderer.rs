use super::types::{Dashboard, PersistedChart};
use crate::charts::{ChartType, SeriesType};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView {
    pub name: String,
    pub series_type: SeriesType,
    pub color: String,
    /// One value per category, in category order.
    pub values: Vec<f64>,
}

/// A persisted chart normalized for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub id: String,
    pub title: String,
    pub chart_type: ChartType,
    pub categories: Vec<String>,
    pub series: Vec<SeriesView>,
}

impl ChartView {
    pub fn new(chart: &PersistedChart, chart_type: ChartType) -> Self {
        let categories = chart.data.iter().map(|d| d.label.clone()).collect();
        let series = chart
            .series
            .iter()
            .map(|s| SeriesView {
                name: s.name.clone(),
                series_type: s.series_type,
                color: s.color.clone(),
                values: chart
                    .data
                    .iter()
                    .map(|d| d.value_for(&s.name).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Self {
            id: chart.id.clone(),
            title: chart.title.clone(),
            chart_type,
            categories,
            series,
        }
    }
}

/// Drawing backend for dashboard charts.
pub trait ChartRenderer {
    type Output;

    fn render_bar(&mut self, view: &ChartView) -> Self::Output;
    fn render_line(&mut self, view: &ChartView) -> Self::Output;
    fn render_pie(&mut self, view: &ChartView) -> Self::Output;
    fn render_unsupported(&mut self, chart: &PersistedChart) -> Self::Output;
}

pub fn render_chart<R: ChartRenderer>(chart: &PersistedChart, renderer: &mut R) -> R::Output {
    match chart.known_type() {
        Some(t @ ChartType::Bar) => renderer.render_bar(&ChartView::new(chart, t)),
        Some(t @ ChartType::Line) => renderer.render_line(&ChartView::new(chart, t)),
        Some(t @ ChartType::Pie) => renderer.render_pie(&ChartView::new(chart, t)),
        _ => renderer.render_unsupported(chart),
    }
}

/// Renders every populated chart of `dashboard` in order. Entries whose chart
/// reference did not resolve are skipped.
pub fn render_dashboard<R: ChartRenderer>(dashboard: &Dashboard, renderer: &mut R) -> Vec<R::Output> {
    dashboard
        .populated_charts()
        .map(|chart| render_chart(chart, renderer))
        .collect()
}

pub fn grid_columns(chart_count: usize) -> usize {
    chart_count.clamp(1, 4)
}

pub fn column_span(chart_type: &str, chart_count: usize) -> usize {
    match chart_type {
        "bar" | "line" if chart_count > 2 => 2,
        _ => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub chart_id: String,
    pub title: String,
    pub chart_type: String,
    pub span: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardGrid {
    pub columns: usize,
    pub cells: Vec<GridCell>,
}

impl DashboardGrid {
    /// Columns and spans follow the dashboard's entry count, resolved or not.
    /// Only resolved charts get a cell.
    pub fn plan(dashboard: &Dashboard) -> Self {
        let count = dashboard.charts.len();
        Self {
            columns: grid_columns(count),
            cells: dashboard
                .populated_charts()
                .map(|c| GridCell {
                    chart_id: c.id.clone(),
                    title: c.title.clone(),
                    chart_type: c.chart_type.clone(),
                    span: column_span(&c.chart_type, count),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartBuilder, ChartContext, ChartType, SeriesField};
    use crate::shared::Row;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder;

    impl ChartRenderer for Recorder {
        type Output = (String, ChartView);

        fn render_bar(&mut self, view: &ChartView) -> Self::Output {
            ("bar".to_string(), view.clone())
        }

        fn render_line(&mut self, view: &ChartView) -> Self::Output {
            ("line".to_string(), view.clone())
        }

        fn render_pie(&mut self, view: &ChartView) -> Self::Output {
            ("pie".to_string(), view.clone())
        }

        fn render_unsupported(&mut self, chart: &PersistedChart) -> Self::Output {
            let view = ChartView::new(chart, ChartType::Mixed);
            ("unsupported".to_string(), view)
        }
    }

    fn rows() -> Vec<Row> {
        serde_json::from_value(json!([
            {"product": "A", "revenue": 10},
            {"product": "B", "revenue": 20},
            {"product": "A", "revenue": 5}
        ]))
        .unwrap()
    }

    fn persisted(chart_type: ChartType) -> PersistedChart {
        let mut builder = ChartBuilder::new();
        builder.set_title("Revenue");
        builder.set_type(chart_type);
        if chart_type.is_pie() {
            builder
                .update_series(0, SeriesField::LabelColumn("product".to_string()))
                .unwrap();
        } else {
            builder.set_x_axis("product").unwrap();
        }
        builder
            .update_series(0, SeriesField::ValueColumn("revenue".to_string()))
            .unwrap();
        let payload = builder.build_payload(&rows(), &ChartContext::new("q1")).unwrap();
        PersistedChart::from_payload("c1", &payload)
    }

    #[test]
    fn test_payload_type_reaches_matching_renderer() {
        let mut renderer = Recorder;
        for (chart_type, expected) in [
            (ChartType::Bar, "bar"),
            (ChartType::Line, "line"),
            (ChartType::Pie, "pie"),
            (ChartType::Mixed, "unsupported"),
        ] {
            let (called, _) = render_chart(&persisted(chart_type), &mut renderer);
            assert_eq!(called, expected);
        }
    }

    #[test]
    fn test_bar_view_matches_built_payload() {
        let (_, view) = render_chart(&persisted(ChartType::Bar), &mut Recorder);
        assert_eq!(view.categories, vec!["A", "B"]);
        assert_eq!(view.series.len(), 1);
        assert_eq!(view.series[0].values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_pie_view_keeps_every_row() {
        let (_, view) = render_chart(&persisted(ChartType::Pie), &mut Recorder);
        assert_eq!(view.categories, vec!["A", "B", "A"]);
        assert_eq!(view.series[0].values, vec![10.0, 20.0, 5.0]);
    }

    #[test]
    fn test_missing_series_value_defaults_to_zero() {
        let mut chart = persisted(ChartType::Bar);
        chart.series[0].name = "renamed".to_string();
        let view = ChartView::new(&chart, ChartType::Bar);
        assert_eq!(view.series[0].values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_grid_columns_and_spans() {
        assert_eq!(
            (1..=6).map(grid_columns).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 4, 4]
        );
        assert_eq!(column_span("bar", 2), 1);
        assert_eq!(column_span("line", 3), 2);
        assert_eq!(column_span("pie", 4), 1);
    }

    #[test]
    fn test_unpopulated_entries_are_skipped_but_counted() {
        let dashboard: Dashboard = serde_json::from_value(json!({
            "_id": "d1",
            "name": "Sales",
            "charts": [
                {"chartId": serde_json::to_value(persisted(ChartType::Bar)).unwrap()},
                {"chartId": null},
                {"chartId": serde_json::to_value(persisted(ChartType::Pie)).unwrap()}
            ]
        }))
        .unwrap();

        assert_eq!(render_dashboard(&dashboard, &mut Recorder).len(), 2);
        let grid = DashboardGrid::plan(&dashboard);
        assert_eq!(grid.columns, 3);
        let spans: Vec<(&str, usize)> = grid
            .cells
            .iter()
            .map(|c| (c.chart_type.as_str(), c.span))
            .collect();
        assert_eq!(spans, vec![("bar", 2), ("pie", 1)]);
    }
}
