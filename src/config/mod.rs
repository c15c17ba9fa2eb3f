use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub token_ttl_days: i64,
    pub preview_page_size: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 10,
            token_ttl_days: 30,
            preview_page_size: 15,
        }
    }
}

impl ClientConfig {
    /// Reads `INSIGHTBOARD_*` variables, loading a `.env` file first if one
    /// exists. Missing or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Self::default();

        let api_url = env::var("INSIGHTBOARD_API_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(normalize_url)
            .unwrap_or(defaults.api_url);

        Self {
            api_url,
            timeout_secs: parse_var("INSIGHTBOARD_TIMEOUT_SECS", defaults.timeout_secs),
            connect_timeout_secs: parse_var(
                "INSIGHTBOARD_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            ),
            token_ttl_days: parse_var("INSIGHTBOARD_TOKEN_TTL_DAYS", defaults.token_ttl_days),
            preview_page_size: parse_var(
                "INSIGHTBOARD_PREVIEW_PAGE_SIZE",
                defaults.preview_page_size,
            ),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = normalize_url(url.into());
        self
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.token_ttl_days)
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn normalize_url(url: String) -> String {
    let url = url.trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("http://{url}")
    } else {
        url
    }
}
