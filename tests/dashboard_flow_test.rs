mod common;

use insightboard::charts::{ChartBuilder, ChartContext, ChartError, ChartType, SeriesField};
use insightboard::dashboards::{
    render_dashboard, AccessLevel, ChartGroup, ChartRenderer, ChartView, DashboardCatalog,
    DashboardError, GroupError, PersistedChart,
};
use insightboard::query::QueryResultCache;
use insightboard::session::Role;
use insightboard::shared::Row;
use mockito::{Matcher, ServerGuard};
use serde_json::json;

fn rows() -> Vec<Row> {
    serde_json::from_value(common::sales_rows()).unwrap()
}

fn bar_chart(title: &str) -> ChartBuilder {
    let mut builder = ChartBuilder::new();
    builder.set_title(title);
    builder.set_x_axis("product").unwrap();
    builder
        .update_series(0, SeriesField::ValueColumn("revenue".to_string()))
        .unwrap();
    builder
}

async fn mock_chart_create(server: &mut ServerGuard, n: usize) -> mockito::Mock {
    server
        .mock("POST", "/api/charts/create")
        .match_body(Matcher::PartialJson(json!({"title": format!("Chart {n}")})))
        .with_status(201)
        .with_body(json!({"success": true, "data": {"_id": format!("c{n}")}}).to_string())
        .expect(1)
        .create_async()
        .await
}

async fn filled_group(server: &mut ServerGuard) -> (ChartGroup, Vec<mockito::Mock>) {
    let client = common::client(server, common::signed_in(Role::Editor));
    let mut group = ChartGroup::new();
    let mut mocks = Vec::new();
    for n in 1..=4 {
        mocks.push(mock_chart_create(server, n).await);
        let mut builder = bar_chart(&format!("Chart {n}"));
        let id = builder
            .save_to_group(&client, &mut group, &ChartContext::new("q1"), &rows())
            .await
            .unwrap();
        assert_eq!(id, format!("c{n}"));
        assert!(builder.spec().title().is_empty());
    }
    (group, mocks)
}

#[tokio::test]
async fn test_chart_save_sends_built_payload() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/charts/create")
        .match_body(Matcher::PartialJson(json!({
            "title": "Revenue",
            "type": "bar",
            "queryId": "q1",
            "createdBy": "u1",
            "data": [
                {"label": "A", "values": [{"key": "revenue", "value": 10.0}]},
                {"label": "B", "values": [{"key": "revenue", "value": 20.0}]}
            ]
        })))
        .with_status(201)
        .with_body(json!({"chartId": "c9"}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Editor));
    let (id, payload) = bar_chart("Revenue")
        .save(&client, &ChartContext::new("q1"), &rows())
        .await
        .unwrap();

    assert_eq!(id, "c9");
    assert_eq!(payload.categories(), vec!["A", "B"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_missing_chart_id_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/charts/create")
        .with_status(200)
        .with_body(json!({"success": true}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Editor));
    let mut group = ChartGroup::new();
    let mut builder = bar_chart("Revenue");
    let err = builder
        .save_to_group(&client, &mut group, &ChartContext::new("q1"), &rows())
        .await
        .unwrap_err();

    assert!(matches!(err, ChartError::Request(ref m) if m == "Failed to save chart"));
    assert!(group.is_empty());
    assert_eq!(builder.spec().title(), "Revenue");
}

#[tokio::test]
async fn test_four_charts_become_one_dashboard() {
    let mut server = mockito::Server::new_async().await;
    let (mut group, chart_mocks) = filled_group(&mut server).await;
    let layout = json!({"x": 0, "y": 0, "w": 6, "h": 4});
    let save = server
        .mock("POST", "/api/dashboard/save")
        .match_body(Matcher::Json(json!({
            "name": "Q3 review",
            "charts": [
                {"chartId": "c1", "layout": layout},
                {"chartId": "c2", "layout": layout},
                {"chartId": "c3", "layout": layout},
                {"chartId": "c4", "layout": layout}
            ],
            "accessLevel": "public"
        })))
        .with_status(201)
        .with_body(
            json!({"success": true, "data": {
                "_id": "d1",
                "name": "Q3 review",
                "accessLevel": "public",
                "charts": [{"chartId": "c1", "layout": layout}]
            }})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Editor));

    // the fifth chart is refused before it is sent anywhere
    let mut fifth = bar_chart("Chart 5");
    let err = fifth
        .save_to_group(&client, &mut group, &ChartContext::new("q1"), &rows())
        .await
        .unwrap_err();
    assert!(matches!(err, ChartError::GroupFull(4)));
    assert_eq!(group.len(), 4);

    let mut catalog = DashboardCatalog::new();
    let saved = catalog
        .save(&client, &mut group, "Q3 review", Some(AccessLevel::Public), Vec::new())
        .await
        .unwrap();
    assert_eq!(saved.id, "d1");
    assert!(group.is_empty());
    assert_eq!(catalog.list()[0].id, "d1");

    for mock in chart_mocks {
        mock.assert_async().await;
    }
    save.assert_async().await;
}

#[tokio::test]
async fn test_failed_dashboard_save_keeps_group() {
    let mut server = mockito::Server::new_async().await;
    let (mut group, _mocks) = filled_group(&mut server).await;
    server
        .mock("POST", "/api/dashboard/save")
        .with_status(409)
        .with_body(json!({"success": false, "message": "Dashboard name already used"}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Editor));
    let err = group
        .save_dashboard(&client, "Q3 review", Some(AccessLevel::Private), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GroupError::Request(ref m) if m == "Dashboard name already used"));
    assert_eq!(group.chart_ids(), vec!["c1", "c2", "c3", "c4"]);
}

#[tokio::test]
async fn test_invalid_dashboard_id_is_rejected_locally() {
    let mut server = mockito::Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Viewer));
    let mut catalog = DashboardCatalog::new();
    for id in ["", "undefined", "null"] {
        let err = catalog.fetch_one(&client, id).await.unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ref m) if m == "Invalid dashboard ID provided"));
    }
    any.assert_async().await;
}

struct Titles;

impl ChartRenderer for Titles {
    type Output = String;

    fn render_bar(&mut self, view: &ChartView) -> String {
        format!("bar:{}", view.title)
    }

    fn render_line(&mut self, view: &ChartView) -> String {
        format!("line:{}", view.title)
    }

    fn render_pie(&mut self, view: &ChartView) -> String {
        format!("pie:{}", view.title)
    }

    fn render_unsupported(&mut self, chart: &PersistedChart) -> String {
        format!("unsupported:{}", chart.chart_type)
    }
}

#[tokio::test]
async fn test_query_to_rendered_dashboard() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/queries/q1")
        .with_status(200)
        .with_body(json!({"data": {"result": common::sales_rows()}}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Editor));
    let mut cache = QueryResultCache::new();
    let rows = cache.fetch(&client, "q1").await.unwrap().to_vec();

    let bar = bar_chart("Revenue")
        .build_payload(&rows, &ChartContext::new("q1"))
        .unwrap();
    let mut pie = ChartBuilder::new();
    pie.set_title("Share");
    pie.set_type(ChartType::Pie);
    pie.update_series(0, SeriesField::LabelColumn("product".to_string()))
        .unwrap();
    pie.update_series(0, SeriesField::ValueColumn("revenue".to_string()))
        .unwrap();
    let pie = pie.build_payload(&rows, &ChartContext::new("q1")).unwrap();

    let bar_doc = serde_json::to_value(PersistedChart::from_payload("c1", &bar)).unwrap();
    let pie_doc = serde_json::to_value(PersistedChart::from_payload("c2", &pie)).unwrap();
    server
        .mock("GET", "/api/dashboard/d1")
        .with_status(200)
        .with_body(
            json!({"data": {
                "_id": "d1",
                "name": "Sales",
                "accessLevel": "private",
                "charts": [
                    {"chartId": bar_doc, "layout": {"x": 0, "y": 0, "w": 6, "h": 4}},
                    {"chartId": null},
                    {"chartId": pie_doc}
                ]
            }})
            .to_string(),
        )
        .create_async()
        .await;

    let mut catalog = DashboardCatalog::new();
    let dashboard = catalog.fetch_one(&client, "d1").await.unwrap().clone();
    assert_eq!(catalog.current().map(|d| d.id.as_str()), Some("d1"));

    let rendered = render_dashboard(&dashboard, &mut Titles);
    assert_eq!(rendered, vec!["bar:Revenue", "pie:Share"]);

    let first = dashboard.populated_charts().next().unwrap();
    let view = ChartView::new(first, ChartType::Bar);
    assert_eq!(view.categories, vec!["A", "B"]);
    assert_eq!(view.series[0].values, vec![10.0, 20.0]);
}

#[tokio::test]
async fn test_dashboard_list_keeps_year_keyed_charts() {
    let mut server = mockito::Server::new_async().await;
    let list = server
        .mock("GET", "/api/dashboard/list")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(
            json!({"data": [
                {"_id": "d1", "name": "Sales", "charts": [
                    {"chartId": {"_id": "c1", "title": "Revenue", "type": "bar",
                                 "series": [{"name": "revenue", "type": "bar"}],
                                 "data": [{"label": "A", "values": [{"key": "revenue", "value": 10}]}]}}
                ]},
                {"_id": "d2", "name": "Yearly", "charts": [
                    {"chartId": {"_id": "c2", "title": "By year", "type": "scatter",
                                 "series": [{"name": "revenue", "type": "scatter"}],
                                 "data": [{"label": 2024, "values": [{"key": "revenue", "value": 7}]}]}}
                ]}
            ]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Viewer));
    let mut catalog = DashboardCatalog::new();
    let dashboards = catalog.fetch_all(&client).await.unwrap();

    let names: Vec<&str> = dashboards.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Sales", "Yearly"]);
    let rendered = render_dashboard(&dashboards[1], &mut Titles);
    assert_eq!(rendered, vec!["unsupported:scatter"]);
    let yearly = dashboards[1].populated_charts().next().unwrap();
    assert_eq!(yearly.data[0].label, "2024");
    list.assert_async().await;
}
