mod common;

use insightboard::auth::{AuthError, AuthService, Credentials};
use insightboard::config::ClientConfig;
use insightboard::data::{DataError, DataSourceRegistry};
use insightboard::session::{Role, Session};
use mockito::Matcher;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/data")
        .match_header("authorization", format!("Bearer {}", common::TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"success": true, "data": [common::sales_source()]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Viewer));
    let mut registry = DataSourceRegistry::new();
    let sources = registry.refresh(&client).await.unwrap();

    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].columns, vec!["product", "revenue"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_no_header_without_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/data")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(json!({"data": []}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, Session::new());
    let mut registry = DataSourceRegistry::new();
    assert!(registry.refresh(&client).await.unwrap().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_notifies() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/data")
        .with_status(401)
        .with_body(json!({"message": "Token expired"}).to_string())
        .create_async()
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let session = common::signed_in(Role::Editor).on_unauthorized(move || {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    let client = common::client(&server, session.clone());

    let err = DataSourceRegistry::new().refresh(&client).await.unwrap_err();

    assert!(matches!(err, DataError::SessionExpired(ref m) if m == "Token expired"));
    assert!(session.token().is_none());
    assert!(session.current_user().is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_message_is_kept_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/data")
        .with_status(500)
        .with_body(json!({"message": "Storage unavailable"}).to_string())
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Admin));
    let err = DataSourceRegistry::new().refresh(&client).await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed: Storage unavailable");
}

#[tokio::test]
async fn test_fallback_message_without_server_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/data")
        .with_status(502)
        .create_async()
        .await;

    let client = common::client(&server, common::signed_in(Role::Admin));
    let err = DataSourceRegistry::new().refresh(&client).await.unwrap_err();
    assert!(matches!(err, DataError::Request(ref m) if m == "Failed to fetch data sources"));
}

#[tokio::test]
async fn test_login_signs_in() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/users/login")
        .match_body(Matcher::Json(json!({"email": "ada@example.com", "password": "pw"})))
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "message": "Login successful",
                "data": {"_id": "u1", "name": "Ada", "email": "ada@example.com",
                         "role": "admin", "token": "fresh"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = ClientConfig::default();
    let session = Session::new();
    let auth = AuthService::new(common::client(&server, session.clone()), &config);
    let user = auth
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "pw".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(user.role, Role::Admin);
    assert_eq!(session.token().as_deref(), Some("fresh"));
    assert!(session.expires_at().is_some());
    assert!(session.can_edit());

    auth.logout();
    assert!(!session.is_valid());
}

#[tokio::test]
async fn test_login_rejection_uses_fallback() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/users/login")
        .with_status(200)
        .with_body(json!({"success": false, "message": ""}).to_string())
        .create_async()
        .await;

    let session = Session::new();
    let auth = AuthService::new(common::client(&server, session.clone()), &ClientConfig::default());
    let err = auth
        .login(&Credentials {
            email: "ada@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Rejected(ref m) if m == "Login failed"));
    assert!(!session.is_valid());
}

#[tokio::test]
async fn test_update_role_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/users/role")
        .match_body(Matcher::Json(json!({"userId": "u2", "role": "editor"})))
        .with_status(200)
        .with_body(json!({"success": true}).to_string())
        .create_async()
        .await;

    let auth = AuthService::new(
        common::client(&server, common::signed_in(Role::Admin)),
        &ClientConfig::default(),
    );
    auth.update_role("u2", Role::Editor).await.unwrap();
    mock.assert_async().await;
}
