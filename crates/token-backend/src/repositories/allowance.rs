use token_core::types::Allowance;

use super::{
    decode_rows, ALLOWANCES_TABLE, ALLOWANCE_COLUMNS, CONTRACTS_TABLE, CONTRACT_SUMMARY,
    PARTY_SUMMARY, PROFILES_TABLE,
};
use crate::query::TableQuery;
use crate::traits::Backend;
use crate::Result;

pub struct AllowanceRepository;

impl AllowanceRepository {
    /// Allowances granted by `owner_id`, newest first, with contract and spender fields
    pub async fn get_by_owner<B: Backend + ?Sized>(
        backend: &B,
        owner_id: &str,
        auth: Option<&str>,
    ) -> Result<Vec<Allowance>> {
        let query = TableQuery::from(ALLOWANCES_TABLE)
            .select(ALLOWANCE_COLUMNS)
            .embed(
                CONTRACTS_TABLE,
                CONTRACTS_TABLE,
                "token_contract_id",
                CONTRACT_SUMMARY,
            )
            .embed("spender", PROFILES_TABLE, "spender_id", PARTY_SUMMARY)
            .eq("owner_id", owner_id)
            .order_desc("created_at");
        let rows = backend.select(&query, auth).await?;
        decode_rows(ALLOWANCES_TABLE, rows)
    }
}
