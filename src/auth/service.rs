use chrono::Duration;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::AuthError;
use crate::api::{ApiClient, ApiError, Envelope};
use crate::config::ClientConfig;
use crate::session::{Role, User};

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<AuthData>,
}

#[derive(Debug, Deserialize)]
struct AuthData {
    #[serde(flatten)]
    user: User,
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleUpdate<'a> {
    user_id: &'a str,
    role: Role,
}

/// Account operations against `/api/users`. A successful login is written to
/// the client's [`Session`](crate::session::Session).
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(client: ApiClient, config: &ClientConfig) -> Self {
        Self {
            client,
            token_ttl: config.token_ttl(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let res: AuthResponse = self
            .client
            .post("/api/users/login", credentials)
            .await
            .map_err(|e| match e {
                ApiError::Unauthorized(msg) => AuthError::Rejected(msg),
                other => AuthError::Request(other.message_or("Network error")),
            })?;

        match res.data {
            Some(data) if res.success => {
                self.client
                    .session()
                    .sign_in(data.token, data.user.clone(), self.token_ttl);
                Ok(data.user)
            }
            _ => {
                let message = non_blank(res.message).unwrap_or_else(|| "Login failed".to_string());
                warn!("Login rejected: {message}");
                Err(AuthError::Rejected(message))
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        let res: AuthResponse = self
            .client
            .post("/api/users/register", request)
            .await
            .map_err(|e| AuthError::from_api(e, "Network error"))?;

        if !res.success {
            let message =
                non_blank(res.message).unwrap_or_else(|| "Registration failed".to_string());
            return Err(AuthError::Rejected(message));
        }
        info!("Registered {}", request.email);
        Ok(())
    }

    pub fn logout(&self) {
        self.client.session().clear();
        info!("Signed out");
    }

    /// Refreshes the signed-in user from the server.
    pub async fn profile(&self) -> Result<User, AuthError> {
        let res: Envelope<User> = self
            .client
            .get("/api/users/profile")
            .await
            .map_err(|e| AuthError::from_api(e, "Failed to fetch profile"))?;
        self.client.session().set_user(res.data.clone());
        Ok(res.data)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        let res: Envelope<Vec<User>> = self
            .client
            .get("/api/users/all")
            .await
            .map_err(|e| AuthError::from_api(e, "Failed to fetch users"))?;
        Ok(res.data)
    }

    pub async fn update_role(&self, user_id: &str, role: Role) -> Result<(), AuthError> {
        let _: Value = self
            .client
            .put("/api/users/role", &RoleUpdate { user_id, role })
            .await
            .map_err(|e| AuthError::from_api(e, "Failed to update role"))?;
        info!("Role of {user_id} set to {role}");
        Ok(())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let path = format!("/api/users/{}", urlencoding::encode(user_id));
        let _: Value = self
            .client
            .delete(&path)
            .await
            .map_err(|e| AuthError::from_api(e, "Failed to delete user"))?;
        Ok(())
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_response_flattens_user_and_token() {
        let res: AuthResponse = serde_json::from_value(json!({
            "success": true,
            "message": "ok",
            "data": {"_id": "u1", "name": "Ada", "email": "ada@example.com",
                     "role": "editor", "token": "tok"}
        }))
        .unwrap();

        let data = res.data.unwrap();
        assert_eq!(data.token, "tok");
        assert_eq!(data.user.id, "u1");
        assert_eq!(data.user.role, Role::Editor);
    }

    #[test]
    fn test_role_update_wire_shape() {
        let body = serde_json::to_value(RoleUpdate {
            user_id: "u2",
            role: Role::Viewer,
        })
        .unwrap();
        assert_eq!(body, json!({"userId": "u2", "role": "viewer"}));
    }

    #[tokio::test]
    async fn test_login_requires_credentials() {
        let client = ApiClient::new(&ClientConfig::default(), crate::session::Session::new());
        let auth = AuthService::new(client, &ClientConfig::default());
        let err = auth
            .login(&Credentials {
                email: " ".to_string(),
                password: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
