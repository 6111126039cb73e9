use token_core::types::TokenContract;

use super::{decode_rows, CONTRACTS_TABLE, CONTRACT_COLUMNS};
use crate::query::TableQuery;
use crate::traits::Backend;
use crate::Result;

pub struct ContractRepository;

impl ContractRepository {
    /// All contracts, newest first
    pub async fn get_all<B: Backend + ?Sized>(
        backend: &B,
        auth: Option<&str>,
    ) -> Result<Vec<TokenContract>> {
        let query = TableQuery::from(CONTRACTS_TABLE)
            .select(CONTRACT_COLUMNS)
            .order_desc("created_at");
        let rows = backend.select(&query, auth).await?;
        decode_rows(CONTRACTS_TABLE, rows)
    }

    /// Get contract by ID
    pub async fn get_by_id<B: Backend + ?Sized>(
        backend: &B,
        id: &str,
        auth: Option<&str>,
    ) -> Result<Option<TokenContract>> {
        let query = TableQuery::from(CONTRACTS_TABLE)
            .select(CONTRACT_COLUMNS)
            .eq("id", id)
            .limit(1);
        let rows = backend.select(&query, auth).await?;
        Ok(decode_rows(CONTRACTS_TABLE, rows)?.into_iter().next())
    }
}
