//! Token accounting facade
//!
//! Every operation resolves to an [`Outcome`]: backend failures and `null`
//! answers are folded into the operation's fallback value, so callers can
//! always render `data` and inspect `error` separately.

use alloy_primitives::U256;
use std::sync::Arc;
use token_backend::repositories::{
    AllowanceRepository, BalanceRepository, ContractRepository, TokenRpc, TransactionRepository,
};
use token_backend::{Backend, BackendError};
use token_core::types::{Allowance, Balance, TokenContract, Transaction};
use token_core::{TokenError, DEFAULT_DECIMALS};
use token_metrics::counters;
use tracing::{debug, warn};

use crate::outcome::Outcome;
use crate::session::Session;

/// Stateless token facade over a [`Backend`].
///
/// Without a session the service runs in preview mode: reads work, and
/// mutations go out anonymously for the backend to reject.
pub struct TokenService<B: ?Sized> {
    backend: Arc<B>,
    session: Option<Session>,
}

impl<B: ?Sized> Clone for TokenService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: self.session.clone(),
        }
    }
}

fn settle<T>(
    operation: &'static str,
    result: Result<Option<T>, BackendError>,
    fallback: impl FnOnce() -> T,
) -> Outcome<T> {
    counters::facade_call(operation);
    match result {
        Ok(Some(data)) => Outcome::ok(data),
        Ok(None) => {
            debug!(operation, "Backend returned null, using fallback");
            Outcome::ok(fallback())
        }
        Err(e) => {
            counters::facade_error(operation);
            warn!(operation, error = %e, "Token operation failed, using fallback");
            Outcome::failed(fallback(), e.into())
        }
    }
}

impl<B: Backend + ?Sized> TokenService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    /// Send subsequent calls on behalf of `session`
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn auth(&self) -> Option<&str> {
        self.session.as_ref().map(Session::access_token)
    }

    pub async fn list_contracts(&self) -> Outcome<Vec<TokenContract>> {
        let result = ContractRepository::get_all(&*self.backend, self.auth()).await;
        settle("list_contracts", result.map(Some), Vec::new)
    }

    /// `None` both when the contract does not exist and when the read fails
    pub async fn get_contract(&self, contract_id: &str) -> Outcome<Option<TokenContract>> {
        let result = ContractRepository::get_by_id(&*self.backend, contract_id, self.auth()).await;
        settle("get_contract", result.map(Some), || None)
    }

    pub async fn get_name(&self, contract_id: &str) -> Outcome<String> {
        let result = TokenRpc::name(&*self.backend, contract_id, self.auth()).await;
        settle("get_name", result, String::new)
    }

    pub async fn get_symbol(&self, contract_id: &str) -> Outcome<String> {
        let result = TokenRpc::symbol(&*self.backend, contract_id, self.auth()).await;
        settle("get_symbol", result, String::new)
    }

    pub async fn get_decimals(&self, contract_id: &str) -> Outcome<u8> {
        let result = TokenRpc::decimals(&*self.backend, contract_id, self.auth()).await;
        settle("get_decimals", result, || DEFAULT_DECIMALS)
    }

    pub async fn get_total_supply(&self, contract_id: &str) -> Outcome<U256> {
        let result = TokenRpc::total_supply(&*self.backend, contract_id, self.auth()).await;
        settle("get_total_supply", result, || U256::ZERO)
    }

    pub async fn get_max_supply(&self, contract_id: &str) -> Outcome<U256> {
        let result = TokenRpc::max_supply(&*self.backend, contract_id, self.auth()).await;
        settle("get_max_supply", result, || U256::ZERO)
    }

    pub async fn balance_of(&self, contract_id: &str, user_address: &str) -> Outcome<U256> {
        let result =
            TokenRpc::balance_of(&*self.backend, contract_id, user_address, self.auth()).await;
        settle("balance_of", result, || U256::ZERO)
    }

    pub async fn get_allowance(
        &self,
        contract_id: &str,
        owner_address: &str,
        spender_address: &str,
    ) -> Outcome<U256> {
        let result = TokenRpc::allowance(
            &*self.backend,
            contract_id,
            owner_address,
            spender_address,
            self.auth(),
        )
        .await;
        settle("get_allowance", result, || U256::ZERO)
    }

    pub async fn transfer(&self, contract_id: &str, to_address: &str, amount: U256) -> Outcome<bool> {
        debug!(contract_id, to_address, %amount, "Transfer");
        let result =
            TokenRpc::transfer(&*self.backend, contract_id, to_address, amount, self.auth()).await;
        settle("transfer", result, || false)
    }

    /// Set the spender's allowance to `amount`; zero revokes it
    pub async fn approve(
        &self,
        contract_id: &str,
        spender_address: &str,
        amount: U256,
    ) -> Outcome<bool> {
        debug!(contract_id, spender_address, %amount, "Approve");
        let result =
            TokenRpc::approve(&*self.backend, contract_id, spender_address, amount, self.auth())
                .await;
        settle("approve", result, || false)
    }

    pub async fn transfer_from(
        &self,
        contract_id: &str,
        from_address: &str,
        to_address: &str,
        amount: U256,
    ) -> Outcome<bool> {
        debug!(contract_id, from_address, to_address, %amount, "Transfer from");
        let result = TokenRpc::transfer_from(
            &*self.backend,
            contract_id,
            from_address,
            to_address,
            amount,
            self.auth(),
        )
        .await;
        settle("transfer_from", result, || false)
    }

    /// Transfer after confirming `owner_address` holds at least `amount`.
    ///
    /// No transfer is sent when the balance read fails or falls short.
    pub async fn checked_transfer(
        &self,
        contract_id: &str,
        owner_address: &str,
        to_address: &str,
        amount: U256,
    ) -> Outcome<bool> {
        let available =
            match TokenRpc::balance_of(&*self.backend, contract_id, owner_address, self.auth())
                .await
            {
                Ok(balance) => balance.unwrap_or(U256::ZERO),
                Err(e) => return settle("checked_transfer", Err(e), || false),
            };

        if amount > available {
            counters::facade_call("checked_transfer");
            counters::facade_error("checked_transfer");
            warn!(contract_id, %available, requested = %amount, "Transfer exceeds balance");
            return Outcome::failed(
                false,
                TokenError::InsufficientBalance {
                    available,
                    requested: amount,
                },
            );
        }

        self.transfer(contract_id, to_address, amount).await
    }

    pub async fn get_user_balances(&self, user_id: &str) -> Outcome<Vec<Balance>> {
        let result = BalanceRepository::get_by_user(&*self.backend, user_id, self.auth()).await;
        settle("get_user_balances", result.map(Some), Vec::new)
    }

    pub async fn get_user_allowances(&self, user_id: &str) -> Outcome<Vec<Allowance>> {
        let result = AllowanceRepository::get_by_owner(&*self.backend, user_id, self.auth()).await;
        settle("get_user_allowances", result.map(Some), Vec::new)
    }

    /// Newest transactions first, at most `limit` of them
    pub async fn get_transactions(&self, contract_id: &str, limit: usize) -> Outcome<Vec<Transaction>> {
        let result =
            TransactionRepository::get_by_contract(&*self.backend, contract_id, limit, self.auth())
                .await
                .map(|mut rows| {
                    rows.truncate(limit);
                    Some(rows)
                });
        settle("get_transactions", result, Vec::new)
    }
}
