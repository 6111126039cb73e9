//! In-process backend.
//!
//! Keeps every table as JSON rows and implements the token procedures with
//! ERC-20 semantics, so the facade can run without a hosted deployment.
//! Used by demo mode and by tests (see [`MemoryBackend::fail_next`]).

use alloy_primitives::U256;
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use token_core::types::{AuthGrant, AuthUser, SignUpMetadata, WireAmount};
use tracing::debug;

use crate::query::{Embed, TableQuery};
use crate::repositories::rpc::*;
use crate::repositories::{
    ALLOWANCES_TABLE, BALANCES_TABLE, CONTRACTS_TABLE, PROFILES_TABLE, TRANSACTIONS_TABLE,
};
use crate::traits::{AuthBackend, Backend};
use crate::{BackendError, Result};

struct Account {
    user_id: String,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Value>>,
    /// email -> account
    accounts: HashMap<String, Account>,
    /// access token -> user id
    sessions: HashMap<String, String>,
    next_id: u64,
    next_block: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    /// Strictly increasing wall-clock timestamps, so creation order is total
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn table(&self, name: &str) -> &[Value] {
        self.tables.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn table_mut(&mut self, name: &str) -> &mut Vec<Value> {
        self.tables.entry(name.to_string()).or_default()
    }

    fn insert(&mut self, table: &str, mut row: Value) -> String {
        let id = match row.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => self.next_id(table.trim_end_matches('s')),
        };
        if let Some(fields) = row.as_object_mut() {
            fields.insert("id".to_string(), json!(id));
            if !fields.contains_key("created_at") {
                let ts = self.next_timestamp();
                fields.insert("created_at".to_string(), json!(ts));
            }
        }
        self.table_mut(table).push(row);
        id
    }

    fn contract(&self, contract_id: &str) -> Result<&Value> {
        self.table(CONTRACTS_TABLE)
            .iter()
            .find(|row| row["id"] == contract_id)
            .ok_or_else(|| BackendError::raised("Token contract not found"))
    }

    /// Resolve a wallet address or user id to a user id
    fn resolve_user(&self, address: &str) -> Option<String> {
        self.table(PROFILES_TABLE)
            .iter()
            .find(|row| {
                row["id"] == address
                    || row["wallet_address"]
                        .as_str()
                        .is_some_and(|w| w.eq_ignore_ascii_case(address))
            })
            .and_then(|row| row["id"].as_str().map(str::to_string))
    }

    fn caller(&self, auth: Option<&str>) -> Result<String> {
        auth.and_then(|token| self.sessions.get(token))
            .cloned()
            .ok_or_else(|| BackendError::raised("Not authenticated"))
    }

    fn balance(&self, contract_id: &str, user_id: &str) -> U256 {
        self.table(BALANCES_TABLE)
            .iter()
            .find(|row| row["token_contract_id"] == contract_id && row["user_id"] == user_id)
            .map(|row| amount_field(row, "balance"))
            .unwrap_or(U256::ZERO)
    }

    fn set_balance(&mut self, contract_id: &str, user_id: &str, amount: U256) {
        let ts = self.next_timestamp();
        let existing = self
            .table_mut(BALANCES_TABLE)
            .iter_mut()
            .find(|row| row["token_contract_id"] == contract_id && row["user_id"] == user_id);
        match existing {
            Some(row) => {
                row["balance"] = json!(amount.to_string());
                row["updated_at"] = json!(ts);
            }
            None => {
                self.insert(
                    BALANCES_TABLE,
                    json!({
                        "user_id": user_id,
                        "token_contract_id": contract_id,
                        "balance": amount.to_string(),
                        "updated_at": ts,
                    }),
                );
            }
        }
    }

    fn allowance(&self, contract_id: &str, owner_id: &str, spender_id: &str) -> U256 {
        self.table(ALLOWANCES_TABLE)
            .iter()
            .find(|row| {
                row["token_contract_id"] == contract_id
                    && row["owner_id"] == owner_id
                    && row["spender_id"] == spender_id
            })
            .map(|row| amount_field(row, "allowance"))
            .unwrap_or(U256::ZERO)
    }

    fn set_allowance(&mut self, contract_id: &str, owner_id: &str, spender_id: &str, amount: U256) {
        let existing = self.table_mut(ALLOWANCES_TABLE).iter_mut().find(|row| {
            row["token_contract_id"] == contract_id
                && row["owner_id"] == owner_id
                && row["spender_id"] == spender_id
        });
        match existing {
            Some(row) => row["allowance"] = json!(amount.to_string()),
            None => {
                self.insert(
                    ALLOWANCES_TABLE,
                    json!({
                        "owner_id": owner_id,
                        "token_contract_id": contract_id,
                        "spender_id": spender_id,
                        "allowance": amount.to_string(),
                    }),
                );
            }
        }
    }

    fn record(
        &mut self,
        contract_id: &str,
        kind: &str,
        amount: U256,
        from: Option<&str>,
        to: Option<&str>,
    ) {
        self.next_block += 1;
        let block = self.next_block;
        self.insert(
            TRANSACTIONS_TABLE,
            json!({
                "token_contract_id": contract_id,
                "transaction_type": kind,
                "amount": amount.to_string(),
                "from_user_id": from,
                "to_user_id": to,
                "transaction_hash": format!("0x{:064x}", block),
                "block_number": block,
            }),
        );
    }

    fn create_account(
        &mut self,
        email: &str,
        password: &str,
        full_name: &str,
        wallet_address: &str,
    ) -> String {
        let user_id = self.insert(
            PROFILES_TABLE,
            json!({
                "email": email,
                "full_name": full_name,
                "wallet_address": wallet_address,
            }),
        );
        self.accounts.insert(
            email.to_lowercase(),
            Account {
                user_id: user_id.clone(),
                password: password.to_string(),
            },
        );
        user_id
    }

    fn move_balance(&mut self, contract_id: &str, from: &str, to: &str, amount: U256) -> Result<()> {
        let available = self.balance(contract_id, from);
        if available < amount {
            return Err(BackendError::raised("Insufficient balance"));
        }
        self.set_balance(contract_id, from, available - amount);
        let received = self.balance(contract_id, to).saturating_add(amount);
        self.set_balance(contract_id, to, received);
        Ok(())
    }
}

fn amount_field(row: &Value, field: &str) -> U256 {
    serde_json::from_value::<WireAmount>(row[field].clone())
        .map(|a| a.0)
        .unwrap_or(U256::ZERO)
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str> {
    params[name]
        .as_str()
        .ok_or_else(|| BackendError::raised(format!("Missing parameter {name}")))
}

fn amount_param(params: &Value) -> Result<U256> {
    serde_json::from_value::<WireAmount>(params["amount"].clone())
        .map(|a| a.0)
        .map_err(|_| BackendError::raised("Invalid amount"))
}

fn matches_filter(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// Keep `columns`, applying `column::text` casts the way PostgREST does
fn project(row: &Value, columns: &[String]) -> Value {
    let mut out = Map::new();
    for column in columns {
        let (name, as_text) = match column.strip_suffix("::text") {
            Some(name) => (name, true),
            None => (column.as_str(), false),
        };
        let value = match row.get(name).cloned().unwrap_or(Value::Null) {
            Value::Number(n) if as_text => Value::String(n.to_string()),
            value => value,
        };
        out.insert(name.to_string(), value);
    }
    Value::Object(out)
}

/// In-memory implementation of [`Backend`] and [`AuthBackend`]
#[derive(Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
    faults: Mutex<VecDeque<BackendError>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next backend call (select or rpc) fail with `error`
    pub fn fail_next(&self, error: BackendError) {
        self.faults.lock().push_back(error);
    }

    fn take_fault(&self) -> Result<()> {
        match self.faults.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Insert a raw row; `id` and `created_at` are filled in when absent
    pub fn insert_row(&self, table: &str, row: Value) -> String {
        self.state.write().insert(table, row)
    }

    /// Snapshot of a table's rows
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state.read().table(table).to_vec()
    }

    pub fn add_contract(&self, name: &str, symbol: &str, decimals: u8, max_supply: U256) -> String {
        let address = {
            let mut state = self.state.write();
            state.next_id += 1;
            format!("0x{:040x}", state.next_id)
        };
        self.insert_row(
            CONTRACTS_TABLE,
            json!({
                "name": name,
                "symbol": symbol,
                "decimals": decimals,
                "contract_address": address,
                "max_supply": max_supply.to_string(),
            }),
        )
    }

    /// Register an account with a profile; returns the user id
    pub fn add_user(&self, email: &str, password: &str, full_name: &str, wallet_address: &str) -> String {
        self.state
            .write()
            .create_account(email, password, full_name, wallet_address)
    }

    /// Credit `amount` to `user_id` and record a mint
    pub fn mint(&self, contract_id: &str, user_id: &str, amount: U256) {
        let mut state = self.state.write();
        let balance = state.balance(contract_id, user_id).saturating_add(amount);
        state.set_balance(contract_id, user_id, balance);
        state.record(contract_id, "mint", amount, None, Some(user_id));
    }

    /// A small PISO ecosystem for demo mode
    pub fn seeded_demo() -> Self {
        let backend = Self::new();
        let unit = |decimals: u64, whole: u64| {
            U256::from(whole) * U256::from(10u64).pow(U256::from(decimals))
        };

        let rewards = backend.add_contract("PISO Rewards", "PSR", 6, unit(6, 50_000_000));
        let piso = backend.add_contract("PISO Token", "PISO", 18, unit(18, 1_000_000_000));

        let ana = backend.add_user(
            "ana@piso.dev",
            "piso-demo",
            "Ana Reyes",
            "0xa11ce00000000000000000000000000000000001",
        );
        let ben = backend.add_user(
            "ben@piso.dev",
            "piso-demo",
            "Ben Santos",
            "0xb0b0000000000000000000000000000000000002",
        );
        let carla = backend.add_user(
            "carla@piso.dev",
            "piso-demo",
            "Carla Mendoza",
            "0xca41a00000000000000000000000000000000003",
        );

        backend.mint(&piso, &ana, unit(18, 250_000));
        backend.mint(&piso, &ben, unit(18, 120_500));
        backend.mint(&piso, &carla, unit(18, 42_000));
        backend.mint(&rewards, &ana, unit(6, 1_500));
        backend.mint(&rewards, &carla, unit(6, 300));

        {
            let mut state = backend.state.write();
            let half = unit(18, 1) / U256::from(2u64);
            let moved = state.move_balance(&piso, &ana, &ben, unit(18, 1_000) + half);
            debug_assert!(moved.is_ok(), "demo transfer exceeds minted balance");
            state.record(&piso, "transfer", unit(18, 1_000) + half, Some(&ana), Some(&ben));
            state.set_allowance(&piso, &ana, &carla, unit(18, 5_000));
            state.record(&piso, "approval", unit(18, 5_000), Some(&ana), Some(&carla));
            let burned = unit(18, 500);
            let remaining = state.balance(&piso, &carla).saturating_sub(burned);
            state.set_balance(&piso, &carla, remaining);
            state.record(&piso, "burn", burned, Some(&carla), None);
        }

        backend
    }

    fn resolve_embed(state: &MemoryState, row: &Value, embed: &Embed) -> Value {
        let Some(key) = row.get(&embed.foreign_key).and_then(Value::as_str) else {
            return Value::Null;
        };
        state
            .table(&embed.table)
            .iter()
            .find(|target| target["id"] == key)
            .map(|target| project(target, &embed.columns))
            .unwrap_or(Value::Null)
    }

    fn call(&self, function: &str, params: &Value, auth: Option<&str>) -> Result<Value> {
        let mut state = self.state.write();
        match function {
            TOKEN_NAME => Ok(state.contract(str_param(params, "contract_id")?)?["name"].clone()),
            TOKEN_SYMBOL => Ok(state.contract(str_param(params, "contract_id")?)?["symbol"].clone()),
            TOKEN_DECIMALS => {
                Ok(state.contract(str_param(params, "contract_id")?)?["decimals"].clone())
            }
            TOKEN_MAX_SUPPLY => {
                Ok(state.contract(str_param(params, "contract_id")?)?["max_supply"].clone())
            }
            TOKEN_TOTAL_SUPPLY => {
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let total = state
                    .table(BALANCES_TABLE)
                    .iter()
                    .filter(|row| row["token_contract_id"] == contract_id)
                    .fold(U256::ZERO, |acc, row| {
                        acc.saturating_add(amount_field(row, "balance"))
                    });
                Ok(json!(total.to_string()))
            }
            TOKEN_BALANCE_OF => {
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let balance = state
                    .resolve_user(str_param(params, "user_address")?)
                    .map(|user| state.balance(contract_id, &user))
                    .unwrap_or(U256::ZERO);
                Ok(json!(balance.to_string()))
            }
            TOKEN_ALLOWANCE => {
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let owner = state.resolve_user(str_param(params, "owner_address")?);
                let spender = state.resolve_user(str_param(params, "spender_address")?);
                let allowance = match (owner, spender) {
                    (Some(owner), Some(spender)) => state.allowance(contract_id, &owner, &spender),
                    _ => U256::ZERO,
                };
                Ok(json!(allowance.to_string()))
            }
            TOKEN_TRANSFER => {
                let caller = state.caller(auth)?;
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let to = state
                    .resolve_user(str_param(params, "to_address")?)
                    .ok_or_else(|| BackendError::raised("Invalid recipient address"))?;
                let amount = amount_param(params)?;
                state.move_balance(contract_id, &caller, &to, amount)?;
                state.record(contract_id, "transfer", amount, Some(&caller), Some(&to));
                Ok(Value::Bool(true))
            }
            TOKEN_APPROVE => {
                let caller = state.caller(auth)?;
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let spender = state
                    .resolve_user(str_param(params, "spender_address")?)
                    .ok_or_else(|| BackendError::raised("Invalid spender address"))?;
                let amount = amount_param(params)?;
                state.set_allowance(contract_id, &caller, &spender, amount);
                state.record(contract_id, "approval", amount, Some(&caller), Some(&spender));
                Ok(Value::Bool(true))
            }
            TOKEN_TRANSFER_FROM => {
                let spender = state.caller(auth)?;
                let contract_id = str_param(params, "contract_id")?;
                state.contract(contract_id)?;
                let from = state
                    .resolve_user(str_param(params, "from_address")?)
                    .ok_or_else(|| BackendError::raised("Invalid sender address"))?;
                let to = state
                    .resolve_user(str_param(params, "to_address")?)
                    .ok_or_else(|| BackendError::raised("Invalid recipient address"))?;
                let amount = amount_param(params)?;
                let allowed = state.allowance(contract_id, &from, &spender);
                if allowed < amount {
                    return Err(BackendError::raised("Insufficient allowance"));
                }
                state.move_balance(contract_id, &from, &to, amount)?;
                state.set_allowance(contract_id, &from, &spender, allowed - amount);
                state.record(contract_id, "transfer", amount, Some(&from), Some(&to));
                Ok(Value::Bool(true))
            }
            other => Err(BackendError::Api {
                status: 404,
                code: Some("PGRST202".to_string()),
                message: format!("Could not find the function public.{other}"),
                details: None,
                hint: None,
            }),
        }
    }

    fn open_session(state: &mut MemoryState, user_id: &str, email: &str) -> AuthGrant {
        let token = state.next_id("mem-session");
        state.sessions.insert(token.clone(), user_id.to_string());
        AuthGrant {
            user: AuthUser {
                id: user_id.to_string(),
                email: Some(email.to_string()),
            },
            access_token: Some(token),
            refresh_token: None,
        }
    }
}

fn invalid_credentials() -> BackendError {
    BackendError::Api {
        status: 400,
        code: Some("invalid_credentials".to_string()),
        message: "Invalid login credentials".to_string(),
        details: None,
        hint: None,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &TableQuery, _auth: Option<&str>) -> Result<Vec<Value>> {
        self.take_fault()?;
        let state = self.state.read();

        let mut rows: Vec<&Value> = state
            .table(&query.table)
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|f| row.get(&f.column).is_some_and(|v| matches_filter(v, &f.value)))
            })
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(&a[&order.column], &b[&order.column]);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        let columns: Option<Vec<String>> = (query.columns != "*").then(|| {
            query
                .columns
                .split(',')
                .map(|c| c.trim().to_string())
                .collect()
        });

        let result = rows
            .into_iter()
            .map(|row| {
                let mut out = match &columns {
                    Some(columns) => project(row, columns),
                    None => row.clone(),
                };
                for embed in &query.embeds {
                    out[&embed.alias] = Self::resolve_embed(&state, row, embed);
                }
                out
            })
            .collect::<Vec<_>>();

        debug!(table = %query.table, rows = result.len(), "Memory select");
        Ok(result)
    }

    async fn rpc(&self, function: &str, params: Value, auth: Option<&str>) -> Result<Value> {
        self.take_fault()?;
        debug!(function, "Memory rpc");
        self.call(function, &params, auth)
    }
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant> {
        self.take_fault()?;
        let mut state = self.state.write();
        let user_id = match state.accounts.get(&email.to_lowercase()) {
            Some(account) if account.password == password => account.user_id.clone(),
            _ => return Err(invalid_credentials()),
        };
        Ok(Self::open_session(&mut state, &user_id, email))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &SignUpMetadata,
    ) -> Result<AuthGrant> {
        self.take_fault()?;
        let mut state = self.state.write();
        if state.accounts.contains_key(&email.to_lowercase()) {
            return Err(BackendError::Api {
                status: 422,
                code: Some("user_already_exists".to_string()),
                message: "User already registered".to_string(),
                details: None,
                hint: None,
            });
        }
        let user_id =
            state.create_account(email, password, &metadata.full_name, &metadata.wallet_address);
        Ok(Self::open_session(&mut state, &user_id, email))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.take_fault()?;
        self.state.write().sessions.remove(access_token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{BalanceRepository, ContractRepository, TokenRpc};

    fn whole(n: u64) -> U256 {
        U256::from(n)
    }

    #[tokio::test]
    async fn test_select_orders_filters_and_limits() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            let group = if i % 2 == 0 { "a" } else { "b" };
            backend.insert_row("items", json!({ "group": group, "n": i }));
        }

        let query = TableQuery::from("items").eq("group", "a").order_desc("created_at").limit(2);
        let rows = backend.select(&query, None).await.unwrap();

        let ns: Vec<i64> = rows.iter().map(|r| r["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![4, 2]);
    }

    #[tokio::test]
    async fn test_select_casts_text_columns() {
        let backend = MemoryBackend::new();
        backend.insert_row("items", json!({ "id": "i1", "balance": 42, "note": "x" }));

        let query = TableQuery::from("items").select("id,balance::text");
        let rows = backend.select(&query, None).await.unwrap();

        assert_eq!(rows, vec![json!({ "id": "i1", "balance": "42" })]);
    }

    #[tokio::test]
    async fn test_select_resolves_embeds() {
        let backend = MemoryBackend::new();
        let contract = backend.add_contract("PISO Token", "PISO", 18, whole(0));
        let user = backend.add_user("ana@piso.dev", "pw", "Ana Reyes", "0xabc");
        backend.mint(&contract, &user, whole(7));

        let balances = BalanceRepository::get_by_user(&backend, &user, None).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, whole(7));
        let summary = balances[0].token_contracts.as_ref().unwrap();
        assert_eq!(summary.symbol.as_deref(), Some("PISO"));
    }

    #[tokio::test]
    async fn test_transfer_requires_session_and_balance() {
        let backend = MemoryBackend::new();
        let contract = backend.add_contract("PISO Token", "PISO", 0, whole(1000));
        let ana = backend.add_user("ana@piso.dev", "pw", "Ana", "0xa");
        backend.add_user("ben@piso.dev", "pw", "Ben", "0xb");
        backend.mint(&contract, &ana, whole(10));

        let err = TokenRpc::transfer(&backend, &contract, "0xb", whole(1), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated");

        let grant = backend.sign_in("ana@piso.dev", "pw").await.unwrap();
        let token = grant.access_token.unwrap();

        let err = TokenRpc::transfer(&backend, &contract, "0xb", whole(11), Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient balance");

        let ok = TokenRpc::transfer(&backend, &contract, "0xB", whole(4), Some(&token))
            .await
            .unwrap();
        assert_eq!(ok, Some(true));
        let left = TokenRpc::balance_of(&backend, &contract, "0xa", None).await.unwrap();
        assert_eq!(left, Some(whole(6)));
        let total = TokenRpc::total_supply(&backend, &contract, None).await.unwrap();
        assert_eq!(total, Some(whole(10)));
    }

    #[tokio::test]
    async fn test_transfer_from_spends_allowance() {
        let backend = MemoryBackend::new();
        let contract = backend.add_contract("PISO Token", "PISO", 0, whole(0));
        let ana = backend.add_user("ana@piso.dev", "pw", "Ana", "0xa");
        backend.add_user("ben@piso.dev", "pw", "Ben", "0xb");
        backend.add_user("carla@piso.dev", "pw", "Carla", "0xc");
        backend.mint(&contract, &ana, whole(100));

        let ana_token = backend.sign_in("ana@piso.dev", "pw").await.unwrap().access_token.unwrap();
        let ben_token = backend.sign_in("ben@piso.dev", "pw").await.unwrap().access_token.unwrap();

        TokenRpc::approve(&backend, &contract, "0xb", whole(30), Some(&ana_token))
            .await
            .unwrap();

        let err = TokenRpc::transfer_from(&backend, &contract, "0xa", "0xc", whole(31), Some(&ben_token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient allowance");

        TokenRpc::transfer_from(&backend, &contract, "0xa", "0xc", whole(20), Some(&ben_token))
            .await
            .unwrap();

        let remaining = TokenRpc::allowance(&backend, &contract, "0xa", "0xb", None).await.unwrap();
        assert_eq!(remaining, Some(whole(10)));
        let carla = TokenRpc::balance_of(&backend, &contract, "0xc", None).await.unwrap();
        assert_eq!(carla, Some(whole(20)));
    }

    #[tokio::test]
    async fn test_fault_injection_applies_once() {
        let backend = MemoryBackend::new();
        backend.fail_next(BackendError::Connection("offline".to_string()));

        let err = ContractRepository::get_all(&backend, None).await.unwrap_err();
        assert_eq!(err, BackendError::Connection("offline".to_string()));
        assert!(ContractRepository::get_all(&backend, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let backend = MemoryBackend::new();
        backend.add_user("ana@piso.dev", "pw", "Ana", "0xa");

        assert_eq!(
            backend.sign_in("ana@piso.dev", "wrong").await.unwrap_err().to_string(),
            "Invalid login credentials"
        );

        let token = backend.sign_in("ANA@piso.dev", "pw").await.unwrap().access_token.unwrap();
        let contract = backend.add_contract("PISO Token", "PISO", 0, whole(0));
        TokenRpc::approve(&backend, &contract, "0xa", whole(1), Some(&token)).await.unwrap();

        backend.sign_out(&token).await.unwrap();
        let err = TokenRpc::approve(&backend, &contract, "0xa", whole(1), Some(&token))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sign_up_registers_once() {
        let backend = std::sync::Arc::new(MemoryBackend::new());
        let metadata = SignUpMetadata {
            full_name: "Dana Cruz".to_string(),
            wallet_address: "0xd".to_string(),
        };

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                let metadata = metadata.clone();
                tokio::spawn(async move { backend.sign_up("dana@piso.dev", "pw", &metadata).await })
            })
            .collect();

        let mut registered = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => registered += 1,
                Err(e) => assert_eq!(e.to_string(), "User already registered"),
            }
        }
        assert_eq!(registered, 1);
        assert_eq!(backend.rows(PROFILES_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_seeded_demo_is_consistent() {
        let backend = MemoryBackend::seeded_demo();
        let contracts = ContractRepository::get_all(&backend, None).await.unwrap();
        assert_eq!(contracts.len(), 2);
        // newest first
        assert_eq!(contracts[0].symbol, "PISO");
        assert_eq!(contracts[1].decimals, 6);
    }
}
