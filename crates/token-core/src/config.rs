use std::env;

/// Sign-in credentials supplied through the environment
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client-side runtime configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Run against the seeded in-memory backend instead of the hosted API
    pub demo_mode: bool,
    /// Page size for transaction history (default: 50)
    pub transaction_limit: usize,
    /// Contract to display; the newest contract when unset
    pub contract_id: Option<String>,
    pub credentials: Option<Credentials>,
}

pub const DEFAULT_TRANSACTION_LIMIT: usize = 50;

impl ClientConfig {
    pub fn from_env() -> Self {
        // Without an API URL there is nothing to talk to but the demo backend
        let demo_mode = env::var("PISO_DEMO")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or_else(|_| env::var("PISO_API_URL").is_err());

        let transaction_limit = env::var("PISO_TRANSACTION_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_TRANSACTION_LIMIT);

        let credentials = match (env::var("PISO_EMAIL"), env::var("PISO_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(Credentials { email, password }),
            _ => None,
        };

        Self {
            demo_mode,
            transaction_limit,
            contract_id: env::var("PISO_CONTRACT_ID").ok(),
            credentials,
        }
    }

    /// A positional command-line argument overrides `PISO_CONTRACT_ID`
    pub fn with_contract_arg(mut self, arg: Option<String>) -> Self {
        if let Some(id) = arg.filter(|s| !s.trim().is_empty()) {
            self.contract_id = Some(id.trim().to_string());
        }
        self
    }
}

/// Remove surrounding quotes and whitespace from an env-supplied value
pub fn sanitize_env_value(value: &str) -> String {
    let trimmed = value.trim();
    let without_quotes = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    without_quotes.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_env_value() {
        assert_eq!(sanitize_env_value("  \"https://api.piso.dev\" "), "https://api.piso.dev");
        assert_eq!(sanitize_env_value("'abc'"), "abc");
        assert_eq!(sanitize_env_value("plain"), "plain");
        assert_eq!(sanitize_env_value("\""), "\"");
    }

    #[test]
    fn test_contract_arg_overrides() {
        let config = ClientConfig {
            demo_mode: true,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
            contract_id: Some("from-env".to_string()),
            credentials: None,
        };
        let config = config.with_contract_arg(Some(" from-arg ".to_string()));
        assert_eq!(config.contract_id.as_deref(), Some("from-arg"));

        let config = config.with_contract_arg(None);
        assert_eq!(config.contract_id.as_deref(), Some("from-arg"));
    }
}
