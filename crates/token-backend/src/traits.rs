use async_trait::async_trait;
use serde_json::Value;
use token_core::types::{AuthGrant, SignUpMetadata};

use crate::query::TableQuery;
use crate::Result;

/// Table reads and stored-procedure calls.
///
/// `auth` is the caller's bearer token; `None` calls anonymously.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Run a filtered, ordered, limited read and return the raw rows
    async fn select(&self, query: &TableQuery, auth: Option<&str>) -> Result<Vec<Value>>;

    /// Call a remote procedure with named parameters
    async fn rpc(&self, function: &str, params: Value, auth: Option<&str>) -> Result<Value>;
}

/// Password authentication against the backend's auth service
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthGrant>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}
