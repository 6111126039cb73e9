use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contract::ContractSummary;
use super::profile::PartySummary;
use super::wire::base_units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Transfer,
    Mint,
    Burn,
    Approval,
    #[serde(other)]
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Transfer => "transfer",
            TransactionType::Mint => "mint",
            TransactionType::Burn => "burn",
            TransactionType::Approval => "approval",
            TransactionType::Unknown => "unknown",
        }
    }
}

/// Append-only audit record (`token_transactions` row with joins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub token_contract_id: String,
    pub transaction_type: TransactionType,
    #[serde(default, with = "base_units")]
    pub amount: U256,
    #[serde(default)]
    pub from_user_id: Option<String>,
    #[serde(default)]
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub token_contracts: Option<ContractSummary>,
    #[serde(default)]
    pub from_user: Option<PartySummary>,
    #[serde(default)]
    pub to_user: Option<PartySummary>,
}
