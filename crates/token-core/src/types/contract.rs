use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire::{base_units, decimals_or_default, default_decimals};

/// A deployed token contract (`token_contracts` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenContract {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals", deserialize_with = "decimals_or_default")]
    pub decimals: u8,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default, with = "base_units")]
    pub total_supply: U256,
    #[serde(default, with = "base_units")]
    pub max_supply: U256,
    pub created_at: DateTime<Utc>,
}

impl TokenContract {
    /// Symbol for display, with the generic fallback
    pub fn display_symbol(&self) -> &str {
        if self.symbol.is_empty() {
            "TOKENS"
        } else {
            &self.symbol
        }
    }
}

/// Contract fields joined onto balance, allowance and transaction rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSummary {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default = "default_decimals", deserialize_with = "decimals_or_default")]
    pub decimals: u8,
}

impl Default for ContractSummary {
    fn default() -> Self {
        Self {
            name: None,
            symbol: None,
            decimals: default_decimals(),
        }
    }
}

impl ContractSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Token")
    }

    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("N/A")
    }
}
