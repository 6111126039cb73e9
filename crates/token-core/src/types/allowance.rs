use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contract::ContractSummary;
use super::profile::PartySummary;
use super::wire::base_units;

/// Owner's authorization for a spender (`token_allowances` row with joins)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allowance {
    pub id: String,
    pub owner_id: String,
    pub token_contract_id: String,
    pub spender_id: String,
    #[serde(default, with = "base_units")]
    pub allowance: U256,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub token_contracts: Option<ContractSummary>,
    #[serde(default)]
    pub spender: Option<PartySummary>,
}

impl Allowance {
    /// A zero allowance is a revoked approval
    pub fn is_revoked(&self) -> bool {
        self.allowance.is_zero()
    }
}
