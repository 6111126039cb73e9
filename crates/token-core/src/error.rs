use alloy_primitives::U256;
use thiserror::Error;

use crate::amount::AmountError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Logical failure reported by the backend (PostgREST / stored procedure)
    #[error("{message}")]
    Backend {
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Backend unavailable: {0}")]
    Transport(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: U256, requested: U256 },

    #[error("Not signed in")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),
}

impl TokenError {
    /// Text shown to the user when an operation fails
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, TokenError>;
