use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of `user_profiles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Counterparty fields joined from `user_profiles`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartySummary {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

impl PartySummary {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("Unknown User")
    }

    pub fn display_wallet(&self) -> &str {
        self.wallet_address.as_deref().unwrap_or("N/A")
    }
}

/// Identity returned by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Result of a successful sign-in or sign-up.
///
/// `access_token` is absent when sign-up is waiting on email confirmation.
#[derive(Clone, PartialEq, Deserialize)]
pub struct AuthGrant {
    pub user: AuthUser,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGrant")
            .field("user", &self.user)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Profile fields attached to a new account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub wallet_address: String,
}
