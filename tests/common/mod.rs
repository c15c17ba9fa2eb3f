#![allow(dead_code)]

use chrono::Duration;
use insightboard::api::ApiClient;
use insightboard::config::ClientConfig;
use insightboard::data::{DataSource, DataSourceRegistry};
use insightboard::session::{Role, Session, User};
use serde_json::{json, Value};

pub const TOKEN: &str = "test-token";

pub fn user(role: Role) -> User {
    User {
        id: "u1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

pub fn signed_in(role: Role) -> Session {
    let session = Session::new();
    session.sign_in(TOKEN.to_string(), user(role), Duration::days(30));
    session
}

pub fn client(server: &mockito::ServerGuard, session: Session) -> ApiClient {
    let config = ClientConfig::default().with_api_url(server.url());
    ApiClient::new(&config, session)
}

pub fn sales_source() -> Value {
    json!({
        "_id": "ds1",
        "name": "sales.csv",
        "columns": ["product", "revenue"],
        "rowCount": 3
    })
}

pub fn registry() -> DataSourceRegistry {
    let source: DataSource = serde_json::from_value(sales_source()).unwrap();
    DataSourceRegistry::from_sources(vec![source])
}

pub fn sales_rows() -> Value {
    json!([
        {"product": "A", "revenue": 10},
        {"product": "B", "revenue": 20},
        {"product": "A", "revenue": 5}
    ])
}
