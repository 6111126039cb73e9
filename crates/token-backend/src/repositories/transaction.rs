use token_core::types::Transaction;

use super::{
    decode_rows, CONTRACTS_TABLE, CONTRACT_SUMMARY, PARTY_SUMMARY, PROFILES_TABLE,
    TRANSACTIONS_TABLE, TRANSACTION_COLUMNS,
};
use crate::query::TableQuery;
use crate::traits::Backend;
use crate::Result;

pub struct TransactionRepository;

impl TransactionRepository {
    /// Latest transactions for a contract, newest first, capped at `limit`
    pub async fn get_by_contract<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        limit: usize,
        auth: Option<&str>,
    ) -> Result<Vec<Transaction>> {
        let query = TableQuery::from(TRANSACTIONS_TABLE)
            .select(TRANSACTION_COLUMNS)
            .embed(
                CONTRACTS_TABLE,
                CONTRACTS_TABLE,
                "token_contract_id",
                CONTRACT_SUMMARY,
            )
            .embed("from_user", PROFILES_TABLE, "from_user_id", PARTY_SUMMARY)
            .embed("to_user", PROFILES_TABLE, "to_user_id", PARTY_SUMMARY)
            .eq("token_contract_id", contract_id)
            .order_desc("created_at")
            .limit(limit);
        let rows = backend.select(&query, auth).await?;
        decode_rows(TRANSACTIONS_TABLE, rows)
    }
}
