use alloy_primitives::U256;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use token_core::types::WireAmount;

use crate::traits::Backend;
use crate::{BackendError, Result};

pub const TOKEN_NAME: &str = "token_name";
pub const TOKEN_SYMBOL: &str = "token_symbol";
pub const TOKEN_DECIMALS: &str = "token_decimals";
pub const TOKEN_TOTAL_SUPPLY: &str = "token_total_supply";
pub const TOKEN_MAX_SUPPLY: &str = "token_max_supply";
pub const TOKEN_BALANCE_OF: &str = "token_balance_of";
pub const TOKEN_ALLOWANCE: &str = "token_allowance";
pub const TOKEN_TRANSFER: &str = "token_transfer";
pub const TOKEN_APPROVE: &str = "token_approve";
pub const TOKEN_TRANSFER_FROM: &str = "token_transfer_from";

/// ERC-20 style stored procedures.
///
/// Every call returns `None` when the procedure answers `null`. Amounts are
/// sent as decimal strings so values past 2^53 arrive intact.
pub struct TokenRpc;

async fn call<B, T>(backend: &B, function: &str, params: Value, auth: Option<&str>) -> Result<Option<T>>
where
    B: Backend + ?Sized,
    T: DeserializeOwned,
{
    let value = backend.rpc(function, params, auth).await?;
    serde_json::from_value::<Option<T>>(value)
        .map_err(|e| BackendError::Decode(format!("{function}: {e}")))
}

impl TokenRpc {
    pub async fn name<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<String>> {
        call(backend, TOKEN_NAME, json!({ "contract_id": contract_id }), auth).await
    }

    pub async fn symbol<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<String>> {
        call(backend, TOKEN_SYMBOL, json!({ "contract_id": contract_id }), auth).await
    }

    pub async fn decimals<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<u8>> {
        call(backend, TOKEN_DECIMALS, json!({ "contract_id": contract_id }), auth).await
    }

    pub async fn total_supply<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<U256>> {
        let amount: Option<WireAmount> = call(
            backend,
            TOKEN_TOTAL_SUPPLY,
            json!({ "contract_id": contract_id }),
            auth,
        )
        .await?;
        Ok(amount.map(|a| a.0))
    }

    pub async fn max_supply<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        auth: Option<&str>,
    ) -> Result<Option<U256>> {
        let amount: Option<WireAmount> = call(
            backend,
            TOKEN_MAX_SUPPLY,
            json!({ "contract_id": contract_id }),
            auth,
        )
        .await?;
        Ok(amount.map(|a| a.0))
    }

    pub async fn balance_of<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        user_address: &str,
        auth: Option<&str>,
    ) -> Result<Option<U256>> {
        let amount: Option<WireAmount> = call(
            backend,
            TOKEN_BALANCE_OF,
            json!({ "contract_id": contract_id, "user_address": user_address }),
            auth,
        )
        .await?;
        Ok(amount.map(|a| a.0))
    }

    pub async fn allowance<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        owner_address: &str,
        spender_address: &str,
        auth: Option<&str>,
    ) -> Result<Option<U256>> {
        let amount: Option<WireAmount> = call(
            backend,
            TOKEN_ALLOWANCE,
            json!({
                "contract_id": contract_id,
                "owner_address": owner_address,
                "spender_address": spender_address,
            }),
            auth,
        )
        .await?;
        Ok(amount.map(|a| a.0))
    }

    pub async fn transfer<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        to_address: &str,
        amount: U256,
        auth: Option<&str>,
    ) -> Result<Option<bool>> {
        call(
            backend,
            TOKEN_TRANSFER,
            json!({
                "contract_id": contract_id,
                "to_address": to_address,
                "amount": amount.to_string(),
            }),
            auth,
        )
        .await
    }

    pub async fn approve<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        spender_address: &str,
        amount: U256,
        auth: Option<&str>,
    ) -> Result<Option<bool>> {
        call(
            backend,
            TOKEN_APPROVE,
            json!({
                "contract_id": contract_id,
                "spender_address": spender_address,
                "amount": amount.to_string(),
            }),
            auth,
        )
        .await
    }

    pub async fn transfer_from<B: Backend + ?Sized>(
        backend: &B,
        contract_id: &str,
        from_address: &str,
        to_address: &str,
        amount: U256,
        auth: Option<&str>,
    ) -> Result<Option<bool>> {
        call(
            backend,
            TOKEN_TRANSFER_FROM,
            json!({
                "contract_id": contract_id,
                "from_address": from_address,
                "to_address": to_address,
                "amount": amount.to_string(),
            }),
            auth,
        )
        .await
    }
}
