use anyhow::{bail, Context};
use log::{error, info};

use insightboard::api::ApiClient;
use insightboard::config::ClientConfig;
use insightboard::dashboards::{
    render_chart, ChartRenderer, ChartView, DashboardCatalog, DashboardGrid, PersistedChart,
};
use insightboard::data::DataSourceRegistry;
use insightboard::session::Session;

const USAGE: &str = "Usage: insightboard <sources | dashboards | preview <id> [page]>";

/// Draws charts as plain text lines.
struct TextRenderer;

impl TextRenderer {
    fn rows(view: &ChartView) -> String {
        let mut out = String::new();
        for (i, category) in view.categories.iter().enumerate() {
            let values: Vec<String> = view
                .series
                .iter()
                .map(|s| format!("{}={}", s.name, s.values.get(i).copied().unwrap_or(0.0)))
                .collect();
            out.push_str(&format!("    {category}: {}\n", values.join(", ")));
        }
        out
    }
}

impl ChartRenderer for TextRenderer {
    type Output = String;

    fn render_bar(&mut self, view: &ChartView) -> String {
        format!("  [bar] {}\n{}", view.title, Self::rows(view))
    }

    fn render_line(&mut self, view: &ChartView) -> String {
        format!("  [line] {}\n{}", view.title, Self::rows(view))
    }

    fn render_pie(&mut self, view: &ChartView) -> String {
        format!("  [pie] {}\n{}", view.title, Self::rows(view))
    }

    fn render_unsupported(&mut self, chart: &PersistedChart) -> String {
        format!("  Unsupported chart type: {}\n", chart.chart_type)
    }
}

async fn list_sources(client: &ApiClient) -> anyhow::Result<()> {
    let mut registry = DataSourceRegistry::new();
    let sources = registry.refresh(client).await?;
    if sources.is_empty() {
        println!("No data sources uploaded yet");
    }
    for source in sources {
        println!(
            "{}  {}  ({} rows)  columns: {}",
            source.id,
            source.name,
            source.row_count,
            source.columns.join(", ")
        );
    }
    Ok(())
}

async fn show_dashboards(client: &ApiClient) -> anyhow::Result<()> {
    let mut catalog = DashboardCatalog::new();
    let dashboards = catalog.fetch_all(client).await?;
    let mut renderer = TextRenderer;
    for dashboard in dashboards {
        let grid = DashboardGrid::plan(dashboard);
        println!(
            "{} [{}] {} columns",
            dashboard.name, dashboard.access_level, grid.columns
        );
        for (cell, chart) in grid.cells.iter().zip(dashboard.populated_charts()) {
            print!("  (span {})\n{}", cell.span, render_chart(chart, &mut renderer));
        }
    }
    Ok(())
}

async fn preview(client: &ApiClient, config: &ClientConfig, args: &[String]) -> anyhow::Result<()> {
    let Some(id) = args.first() else {
        bail!("{USAGE}");
    };
    let page = match args.get(1) {
        Some(p) => p.parse::<u32>().context("page must be a positive number")?,
        None => 1,
    };

    let mut registry = DataSourceRegistry::new();
    let data = registry
        .load_preview(client, id, page, config.preview_page_size)
        .await?;
    println!("{}", data.columns.join("\t"));
    for row in &data.rows {
        let cells: Vec<String> = data
            .columns
            .iter()
            .map(|c| {
                insightboard::shared::values::display_value(row.get(c)).unwrap_or_default()
            })
            .collect();
        println!("{}", cells.join("\t"));
    }
    println!(
        "page {} of {} ({} rows)",
        data.page.unwrap_or(page),
        data.total_pages.unwrap_or(1),
        data.total_rows
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = ClientConfig::from_env();
    let session = match std::env::var("INSIGHTBOARD_TOKEN") {
        Ok(token) if !token.trim().is_empty() => Session::with_token(token.trim()),
        _ => Session::new(),
    }
    .on_unauthorized(|| error!("Token rejected, set INSIGHTBOARD_TOKEN to a fresh token"));
    let client = ApiClient::new(&config, session);
    info!("Using API at {}", client.base_url());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("sources") => list_sources(&client).await,
        Some("dashboards") => show_dashboards(&client).await,
        Some("preview") => preview(&client, &config, &args[1..]).await,
        Some("--help") | Some("-h") | None => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => bail!("Unknown command: {other}\n{USAGE}"),
    }
}
