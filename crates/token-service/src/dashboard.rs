//! Dashboard state: contracts, the selected contract, and the user's data

use token_backend::Backend;
use token_core::types::{Allowance, Balance, TokenContract, Transaction};
use tracing::{info, warn};

use crate::facade::TokenService;
use crate::forms::{ApprovalForm, SubmitOutcome, TransferForm};
use crate::history::{page_notice, TransactionView};
use crate::overview::TokenOverview;

pub struct TokenDashboard<B: ?Sized> {
    service: TokenService<B>,
    transaction_limit: usize,
    contracts: Vec<TokenContract>,
    selected: Option<TokenContract>,
    balances: Vec<Balance>,
    allowances: Vec<Allowance>,
    transactions: Vec<Transaction>,
    error: Option<String>,
}

impl<B: Backend + ?Sized> TokenDashboard<B> {
    pub fn new(service: TokenService<B>, transaction_limit: usize) -> Self {
        Self {
            service,
            transaction_limit,
            contracts: Vec::new(),
            selected: None,
            balances: Vec::new(),
            allowances: Vec::new(),
            transactions: Vec::new(),
            error: None,
        }
    }

    pub fn service(&self) -> &TokenService<B> {
        &self.service
    }

    pub fn contracts(&self) -> &[TokenContract] {
        &self.contracts
    }

    pub fn selected(&self) -> Option<&TokenContract> {
        self.selected.as_ref()
    }

    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    pub fn allowances(&self) -> &[Allowance] {
        &self.allowances
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Load contracts and select `preferred`, or the newest one
    pub async fn load(&mut self, preferred: Option<&str>) {
        self.error = None;

        let contracts = self.service.list_contracts().await;
        if let Some(error) = contracts.error {
            self.error = Some(format!("Failed to load token contracts: {}", error.message()));
            return;
        }
        self.contracts = contracts.data;

        let chosen = preferred
            .and_then(|id| {
                let found = self.contracts.iter().find(|c| c.id == id);
                if found.is_none() {
                    warn!(contract_id = id, "Requested contract not found, using newest");
                }
                found
            })
            .or_else(|| self.contracts.first())
            .cloned();

        info!(
            contracts = self.contracts.len(),
            selected = chosen.as_ref().map(|c| c.symbol.as_str()).unwrap_or("none"),
            "Dashboard loaded"
        );
        self.selected = chosen;
        if self.selected.is_some() {
            self.reload_user_data().await;
        }
    }

    /// Switch contracts; false when `contract_id` is not listed
    pub async fn select_contract(&mut self, contract_id: &str) -> bool {
        let Some(contract) = self.contracts.iter().find(|c| c.id == contract_id).cloned() else {
            return false;
        };
        self.selected = Some(contract);
        self.reload_user_data().await;
        true
    }

    /// Re-read balances and allowances (when signed in) and the selected
    /// contract's history
    pub async fn reload_user_data(&mut self) {
        if let Some(user_id) = self.service.session().map(|s| s.user_id().to_string()) {
            self.balances = self.service.get_user_balances(&user_id).await.data;
            self.allowances = self.service.get_user_allowances(&user_id).await.data;
        } else {
            self.balances.clear();
            self.allowances.clear();
        }

        self.transactions = match &self.selected {
            Some(contract) => {
                self.service
                    .get_transactions(&contract.id, self.transaction_limit)
                    .await
                    .data
            }
            None => Vec::new(),
        };
    }

    pub fn balance_for(&self, contract_id: &str) -> Option<&Balance> {
        self.balances
            .iter()
            .find(|b| b.token_contract_id == contract_id)
    }

    pub fn selected_balance(&self) -> Option<&Balance> {
        self.selected
            .as_ref()
            .and_then(|c| self.balance_for(&c.id))
    }

    pub async fn overview(&self) -> Option<TokenOverview> {
        match &self.selected {
            Some(contract) => Some(TokenOverview::load(&self.service, &contract.id).await),
            None => None,
        }
    }

    pub fn transaction_views(&self) -> Vec<TransactionView<'_>> {
        let (decimals, symbol) = self
            .selected
            .as_ref()
            .map(|c| (c.decimals, c.symbol.as_str()))
            .unwrap_or((token_core::DEFAULT_DECIMALS, ""));
        self.transactions
            .iter()
            .map(|tx| TransactionView::new(tx, decimals, symbol))
            .collect()
    }

    pub fn history_notice(&self) -> Option<String> {
        page_notice(self.transactions.len(), self.transaction_limit)
    }

    pub async fn submit_transfer(&mut self, form: &mut TransferForm) -> SubmitOutcome {
        let outcome = form
            .submit(&self.service, self.selected.as_ref(), self.selected_balance())
            .await;
        if outcome == SubmitOutcome::Completed {
            self.reload_user_data().await;
        }
        outcome
    }

    pub async fn submit_approval(&mut self, form: &mut ApprovalForm) -> SubmitOutcome {
        let outcome = form.submit(&self.service, self.selected.as_ref()).await;
        if outcome == SubmitOutcome::Completed {
            self.reload_user_data().await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use std::sync::Arc;
    use token_backend::{BackendError, MemoryBackend};
    use token_core::DEFAULT_TRANSACTION_LIMIT;

    use crate::session::Authenticator;

    async fn signed_in_dashboard(backend: Arc<MemoryBackend>) -> TokenDashboard<MemoryBackend> {
        let session = Authenticator::new(backend.clone())
            .sign_in("ana@piso.dev", "piso-demo")
            .await
            .unwrap();
        let service = TokenService::new(backend).with_session(session);
        TokenDashboard::new(service, DEFAULT_TRANSACTION_LIMIT)
    }

    #[tokio::test]
    async fn test_load_selects_newest_contract() {
        let backend = Arc::new(MemoryBackend::seeded_demo());
        let mut dashboard = signed_in_dashboard(backend).await;
        dashboard.load(None).await;

        assert!(dashboard.error().is_none());
        let selected = dashboard.selected().unwrap();
        assert_eq!(selected.symbol, "PISO");
        assert!(dashboard.selected_balance().is_some());
        assert_eq!(dashboard.balances().len(), 2);
        assert_eq!(dashboard.allowances().len(), 1);
        assert!(!dashboard.transactions().is_empty());
        assert_eq!(dashboard.history_notice(), None);
    }

    #[tokio::test]
    async fn test_load_failure_message() {
        let backend = Arc::new(MemoryBackend::seeded_demo());
        backend.fail_next(BackendError::Connection("offline".to_string()));
        let mut dashboard = TokenDashboard::new(TokenService::new(backend), 50);
        dashboard.load(None).await;

        assert_eq!(
            dashboard.error(),
            Some("Failed to load token contracts: Backend unavailable: offline")
        );
        assert!(dashboard.selected().is_none());
    }

    #[tokio::test]
    async fn test_preview_mode_has_history_but_no_balances() {
        let backend = Arc::new(MemoryBackend::seeded_demo());
        let mut dashboard = TokenDashboard::new(TokenService::new(backend), 50);
        dashboard.load(None).await;

        assert!(dashboard.balances().is_empty());
        assert!(!dashboard.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_select_contract_and_preferred() {
        let backend = Arc::new(MemoryBackend::seeded_demo());
        let mut dashboard = signed_in_dashboard(backend).await;
        dashboard.load(None).await;

        let other = dashboard.contracts()[1].id.clone();
        assert!(dashboard.select_contract(&other).await);
        assert_eq!(dashboard.selected().unwrap().symbol, "PSR");
        assert!(!dashboard.select_contract("missing").await);

        dashboard.load(Some(&other)).await;
        assert_eq!(dashboard.selected().unwrap().id, other);
        dashboard.load(Some("missing")).await;
        assert_eq!(dashboard.selected().unwrap().symbol, "PISO");
    }

    #[tokio::test]
    async fn test_transfer_reloads_user_data() {
        let backend = Arc::new(MemoryBackend::seeded_demo());
        let mut dashboard = signed_in_dashboard(backend).await;
        dashboard.load(None).await;
        let before = dashboard.selected_balance().unwrap().balance;
        let history = dashboard.transactions().len();

        let mut form = TransferForm::new();
        form.set_recipient("0xb0b0000000000000000000000000000000000002");
        form.set_amount("0.5");
        assert_eq!(dashboard.submit_transfer(&mut form).await, SubmitOutcome::Completed);

        let half = U256::from(5u64) * U256::from(10u64).pow(U256::from(17u64));
        assert_eq!(dashboard.selected_balance().unwrap().balance, before - half);
        assert_eq!(dashboard.transactions().len(), history + 1);
        let latest = &dashboard.transaction_views()[0];
        assert_eq!(latest.amount(), "0.5 PISO");
        assert_eq!(
            latest.parties().as_deref(),
            Some("From: Ana Reyes → To: Ben Santos")
        );
    }
}
