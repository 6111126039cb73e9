use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contract::ContractSummary;
use super::wire::base_units;

/// A user's holding of one token (`token_balances` row with contract join)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub id: String,
    pub user_id: String,
    pub token_contract_id: String,
    #[serde(default, with = "base_units")]
    pub balance: U256,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub token_contracts: Option<ContractSummary>,
}

impl Balance {
    pub fn decimals(&self) -> u8 {
        self.token_contracts
            .as_ref()
            .map(|c| c.decimals)
            .unwrap_or(crate::amount::DEFAULT_DECIMALS)
    }
}
