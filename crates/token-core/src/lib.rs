//! Domain types, amount encoding and configuration for the PISO token client.

pub mod amount;
pub mod config;
pub mod error;
pub mod types;

pub use amount::{
    format_base_units, format_token_amount, format_token_amount_raw, parse_token_amount,
    AmountError, DEFAULT_DECIMALS,
};
pub use config::{ClientConfig, Credentials, DEFAULT_TRANSACTION_LIMIT};
pub use error::{Result, TokenError};
