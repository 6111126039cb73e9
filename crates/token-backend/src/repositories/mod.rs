mod allowance;
mod balance;
mod contract;
mod profile;
pub mod rpc;
mod transaction;

pub use allowance::AllowanceRepository;
pub use balance::BalanceRepository;
pub use contract::ContractRepository;
pub use profile::ProfileRepository;
pub use rpc::TokenRpc;
pub use transaction::TransactionRepository;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{BackendError, Result};

pub const CONTRACTS_TABLE: &str = "token_contracts";
pub const BALANCES_TABLE: &str = "token_balances";
pub const ALLOWANCES_TABLE: &str = "token_allowances";
pub const TRANSACTIONS_TABLE: &str = "token_transactions";
pub const PROFILES_TABLE: &str = "user_profiles";

/// Base columns per table; `numeric` amounts are cast to text so they arrive exact
const CONTRACT_COLUMNS: &str =
    "id,name,symbol,decimals,contract_address,total_supply::text,max_supply::text,created_at";
const BALANCE_COLUMNS: &str = "id,user_id,token_contract_id,balance::text,created_at,updated_at";
const ALLOWANCE_COLUMNS: &str =
    "id,owner_id,token_contract_id,spender_id,allowance::text,created_at";
const TRANSACTION_COLUMNS: &str = "id,token_contract_id,transaction_type,amount::text,\
    from_user_id,to_user_id,transaction_hash,block_number,created_at";

/// Contract columns joined onto balances, allowances and transactions
const CONTRACT_SUMMARY: &[&str] = &["name", "symbol", "decimals"];
/// Profile columns joined for counterparties
const PARTY_SUMMARY: &[&str] = &["full_name", "wallet_address"];

fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row)
                .map_err(|e| BackendError::Decode(format!("{table} row: {e}")))
        })
        .collect()
}
