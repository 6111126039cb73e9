//! HTTP backend: PostgREST for tables and procedures, GoTrue for auth.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use token_core::types::{AuthGrant, AuthUser, SignUpMetadata};
use token_metrics::{counters, histograms};
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::query::TableQuery;
use crate::traits::{AuthBackend, Backend};
use crate::{BackendError, Result};

/// Error body shapes returned by PostgREST and GoTrue
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl ApiErrorBody {
    fn into_error(self, status: u16, raw: &str) -> BackendError {
        let code = self.error_code.or_else(|| match self.code {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    raw.to_string()
                }
            });
        BackendError::Api {
            status,
            code,
            message,
            details: self.details,
            hint: self.hint,
        }
    }
}

/// Backend speaking to a hosted PostgREST + GoTrue deployment
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    config: BackendConfig,
}

impl RestBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        info!(
            url = %config.url,
            schema = %config.schema,
            timeout_secs = config.request_timeout_secs,
            "Creating REST backend"
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn authorize(&self, request: RequestBuilder, auth: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(auth.unwrap_or(&self.config.api_key))
    }

    async fn read_json(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(parsed.into_error(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn send(&self, kind: &'static str, request: RequestBuilder) -> Result<Value> {
        let start = Instant::now();
        counters::backend_request(kind);
        let result = match request.send().await {
            Ok(response) => Self::read_json(response).await,
            Err(e) => Err(e.into()),
        };
        histograms::backend_request_duration(start.elapsed(), kind);
        result
    }

    /// Check the REST endpoint answers
    pub async fn health_check(&self) -> Result<()> {
        let request = self.authorize(self.client.get(self.config.rest_url("")), None);
        self.send("select", request).await.map(|_| ())
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &TableQuery, auth: Option<&str>) -> Result<Vec<Value>> {
        debug!(table = %query.table, select = %query.select_clause(), "Selecting rows");

        let request = self
            .client
            .get(self.config.rest_url(&query.table))
            .query(&query.to_query_pairs())
            .header("Accept-Profile", &self.config.schema);
        let body = self.send("select", self.authorize(request, auth)).await?;

        match body {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(BackendError::Decode(format!(
                "expected an array of rows from {}, got {}",
                query.table, other
            ))),
        }
    }

    async fn rpc(&self, function: &str, params: Value, auth: Option<&str>) -> Result<Value> {
        debug!(function, "Calling remote procedure");

        let request = self
            .client
            .post(self.config.rest_url(&format!("rpc/{function}")))
            .header("Content-Profile", &self.config.schema)
            .json(&params);
        self.send("rpc", self.authorize(request, auth)).await
    }
}

#[async_trait]
impl AuthBackend for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant> {
        let request = self
            .client
            .post(self.config.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body = self.send("auth", self.authorize(request, None)).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthGrant> {
        let request = self.client.post(self.config.auth_url("signup")).json(&json!({
            "email": email,
            "password": password,
            "data": metadata,
        }));
        let body = self.send("auth", self.authorize(request, None)).await?;

        // With email confirmation enabled the bare user comes back, no session
        if body.get("user").is_some() {
            Ok(serde_json::from_value(body)?)
        } else {
            let user: AuthUser = serde_json::from_value(body)?;
            Ok(AuthGrant {
                user,
                access_token: None,
                refresh_token: None,
            })
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let request = self.client.post(self.config.auth_url("logout"));
        self.send("auth", self.authorize(request, Some(access_token)))
            .await
            .map(|_| ())
    }
}
