use serde::Deserialize;
use token_core::config::sanitize_env_value;
use token_core::{Result, TokenError};

#[derive(Clone, Deserialize)]
pub struct BackendConfig {
    /// Project base URL; `/rest/v1` and `/auth/v1` hang off it
    pub url: String,

    /// Anonymous API key sent as `apikey` on every request
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Database schema exposed through the API
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_schema() -> String {
    "public".to_string()
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("schema", &self.schema)
            .finish()
    }
}

impl BackendConfig {
    pub fn new(url: &str, api_key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            request_timeout_secs: default_request_timeout(),
            schema: default_schema(),
        }
    }

    /// Load from `PISO_API_URL`, `PISO_API_KEY`, `PISO_REQUEST_TIMEOUT_SECS`, `PISO_SCHEMA`
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("PISO_API_URL")
            .map_err(|_| TokenError::MissingEnvVar("PISO_API_URL".to_string()))?;
        let api_key = std::env::var("PISO_API_KEY")
            .map_err(|_| TokenError::MissingEnvVar("PISO_API_KEY".to_string()))?;

        let url = sanitize_env_value(&url);
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TokenError::Config(format!(
                "PISO_API_URL must be an http(s) URL, got {url}"
            )));
        }

        let mut config = Self::new(&url, &sanitize_env_value(&api_key));
        config.request_timeout_secs = std::env::var("PISO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_request_timeout);
        config.schema = std::env::var("PISO_SCHEMA").unwrap_or_else(|_| default_schema());
        Ok(config)
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.url, path)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path)
    }
}
