pub mod catalog;
pub mod error;
pub mod group;
pub mod renderer;
pub mod types;

pub use catalog::DashboardCatalog;
pub use error::{DashboardError, GroupError};
pub use group::{ChartGroup, ChartGroupEntry, MAX_CHARTS};
pub use renderer::{
    column_span, grid_columns, render_chart, render_dashboard, ChartRenderer, ChartView,
    DashboardGrid, GridCell, SeriesView,
};
pub use types::*;
