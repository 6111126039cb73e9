//! Transfer and approval form workflows

use alloy_primitives::U256;
use token_backend::Backend;
use token_core::amount::{format_base_units, format_token_amount_raw, is_positive};
use token_core::parse_token_amount;
use token_core::types::{Balance, TokenContract};
use tracing::info;

use crate::facade::TokenService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent
    Rejected,
    /// The backend refused or could not be reached
    Failed,
    /// Mutation applied; user data should be reloaded
    Completed,
}

fn symbol_or_default(contract: &TokenContract) -> &str {
    if contract.symbol.is_empty() {
        "tokens"
    } else {
        &contract.symbol
    }
}

/// Shared message state of both forms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Messages {
    error: Option<String>,
    success: Option<String>,
}

impl Messages {
    fn clear(&mut self) {
        self.error = None;
        self.success = None;
    }

    fn reject(&mut self, message: impl Into<String>) -> SubmitOutcome {
        self.error = Some(message.into());
        SubmitOutcome::Rejected
    }

    fn fail(&mut self, message: impl Into<String>) -> SubmitOutcome {
        self.error = Some(message.into());
        SubmitOutcome::Failed
    }
}

/// Checks common to both forms; returns the selected contract
fn require_context<'c, B: Backend + ?Sized>(
    messages: &mut Messages,
    service: &TokenService<B>,
    contract: Option<&'c TokenContract>,
    signed_out_message: &str,
) -> Option<&'c TokenContract> {
    if service.session().is_none() {
        messages.reject(signed_out_message);
        return None;
    }
    match contract {
        Some(contract) if !contract.id.is_empty() => Some(contract),
        _ => {
            messages.reject("No token contract selected");
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransferForm {
    recipient: String,
    amount: String,
    messages: Messages,
}

impl TransferForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn error(&self) -> Option<&str> {
        self.messages.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.messages.success.as_deref()
    }

    pub fn set_recipient(&mut self, value: impl Into<String>) {
        self.recipient = value.into();
        self.messages.clear();
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.amount = value.into();
        self.messages.clear();
    }

    /// The balance as shown next to the "Max" button
    pub fn max_amount(contract: &TokenContract, balance: Option<&Balance>) -> String {
        balance
            .and_then(|b| format_base_units(b.balance, contract.decimals).ok())
            .unwrap_or_else(|| "0".to_string())
    }

    /// Fill the amount with the whole balance, exactly
    pub fn fill_max(&mut self, contract: &TokenContract, balance: Option<&Balance>) {
        let exact = balance
            .and_then(|b| format_token_amount_raw(b.balance, contract.decimals).ok())
            .unwrap_or_else(|| "0".to_string());
        self.set_amount(exact);
    }

    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        service: &TokenService<B>,
        contract: Option<&TokenContract>,
        balance: Option<&Balance>,
    ) -> SubmitOutcome {
        self.messages.clear();

        let Some(contract) = require_context(
            &mut self.messages,
            service,
            contract,
            "You must be signed in to transfer tokens",
        ) else {
            return SubmitOutcome::Rejected;
        };

        let recipient = self.recipient.trim().to_string();
        if recipient.is_empty() {
            return self.messages.reject("Please enter a recipient address");
        }

        let amount = self.amount.trim().to_string();
        let units = match is_positive(&amount) {
            Ok(true) => match parse_token_amount(&amount, contract.decimals) {
                // finer than the contract's decimals truncates to nothing
                Ok(units) if !units.is_zero() => units,
                _ => return self.messages.reject("Please enter a valid amount"),
            },
            _ => return self.messages.reject("Please enter a valid amount"),
        };

        let symbol = symbol_or_default(contract);
        let available = balance.map(|b| b.balance).unwrap_or(U256::ZERO);
        if available < units {
            let held = format_base_units(available, contract.decimals)
                .unwrap_or_else(|_| "0".to_string());
            return self
                .messages
                .reject(format!("Insufficient balance. You have {held} {symbol}"));
        }

        let outcome = service.transfer(&contract.id, &recipient, units).await;
        if let Some(error) = outcome.error {
            return self.messages.fail(format!("Transfer failed: {}", error.message()));
        }
        if !outcome.data {
            return self
                .messages
                .fail("Transfer failed. Please check your balance and try again.");
        }

        info!(contract_id = %contract.id, %recipient, %amount, "Transfer submitted");
        self.messages.success = Some(format!("Successfully transferred {amount} {symbol}!"));
        self.recipient.clear();
        self.amount.clear();
        SubmitOutcome::Completed
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApprovalForm {
    spender: String,
    amount: String,
    messages: Messages,
}

impl ApprovalForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spender(&self) -> &str {
        &self.spender
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn error(&self) -> Option<&str> {
        self.messages.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.messages.success.as_deref()
    }

    pub fn set_spender(&mut self, value: impl Into<String>) {
        self.spender = value.into();
        self.messages.clear();
    }

    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.amount = value.into();
        self.messages.clear();
    }

    pub async fn submit<B: Backend + ?Sized>(
        &mut self,
        service: &TokenService<B>,
        contract: Option<&TokenContract>,
    ) -> SubmitOutcome {
        self.messages.clear();

        let Some(contract) = require_context(
            &mut self.messages,
            service,
            contract,
            "You must be signed in to approve token spending",
        ) else {
            return SubmitOutcome::Rejected;
        };

        let spender = self.spender.trim().to_string();
        if spender.is_empty() {
            return self.messages.reject("Please enter a spender address");
        }

        let amount = self.amount.trim().to_string();
        let (units, revoking) = match (
            parse_token_amount(&amount, contract.decimals),
            is_positive(&amount),
        ) {
            (Ok(units), Ok(positive)) if !(positive && units.is_zero()) => (units, !positive),
            _ => {
                return self
                    .messages
                    .reject("Please enter a valid amount (use 0 to revoke approval)")
            }
        };

        let outcome = service.approve(&contract.id, &spender, units).await;
        if let Some(error) = outcome.error {
            return self.messages.fail(format!("Approval failed: {}", error.message()));
        }
        if !outcome.data {
            return self.messages.fail("Approval failed. Please try again.");
        }

        let action = if revoking { "revoked approval for" } else { "approved" };
        info!(contract_id = %contract.id, %spender, %amount, revoking, "Approval submitted");
        self.messages.success = Some(format!(
            "Successfully {action} {amount} {}!",
            symbol_or_default(contract)
        ));
        self.spender.clear();
        self.amount.clear();
        SubmitOutcome::Completed
    }
}
