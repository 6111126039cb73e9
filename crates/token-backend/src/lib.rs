pub mod config;
pub mod memory;
pub mod query;
pub mod repositories;
pub mod rest;
pub mod traits;

pub use config::BackendConfig;
pub use memory::MemoryBackend;
pub use query::{Embed, TableQuery};
pub use rest::RestBackend;
pub use traits::{AuthBackend, Backend};

use thiserror::Error;
use token_core::TokenError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error body returned by the API (PostgREST, stored procedure or auth)
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BackendError {
    /// An error as a stored procedure would raise it (`RAISE EXCEPTION`)
    pub fn raised(message: impl Into<String>) -> Self {
        BackendError::Api {
            status: 400,
            code: Some("P0001".to_string()),
            message: message.into(),
            details: None,
            hint: None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}

impl From<BackendError> for TokenError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Connection(message) => TokenError::Transport(message),
            BackendError::Api {
                code,
                message,
                details,
                hint,
                ..
            } => TokenError::Backend {
                code,
                message,
                details,
                hint,
            },
            BackendError::Decode(message) => TokenError::Decode(message),
            BackendError::Config(message) => TokenError::Config(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
