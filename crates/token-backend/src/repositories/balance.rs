use token_core::types::Balance;

use super::{
    decode_rows, BALANCES_TABLE, BALANCE_COLUMNS, CONTRACTS_TABLE, CONTRACT_SUMMARY,
};
use crate::query::TableQuery;
use crate::traits::Backend;
use crate::Result;

pub struct BalanceRepository;

impl BalanceRepository {
    /// A user's balances across contracts, newest first, with contract fields
    pub async fn get_by_user<B: Backend + ?Sized>(
        backend: &B,
        user_id: &str,
        auth: Option<&str>,
    ) -> Result<Vec<Balance>> {
        let query = TableQuery::from(BALANCES_TABLE)
            .select(BALANCE_COLUMNS)
            .embed(
                CONTRACTS_TABLE,
                CONTRACTS_TABLE,
                "token_contract_id",
                CONTRACT_SUMMARY,
            )
            .eq("user_id", user_id)
            .order_desc("created_at");
        let rows = backend.select(&query, auth).await?;
        decode_rows(BALANCES_TABLE, rows)
    }
}
