//! Transaction history rows as the dashboard renders them

use token_core::format_base_units;
use token_core::types::{PartySummary, Transaction, TransactionType};

const UNKNOWN_PARTY: &str = "Unknown";
const SHORT_HASH_LEN: usize = 8;

fn party_name(party: Option<&PartySummary>) -> &str {
    party
        .and_then(|p| p.full_name.as_deref())
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_PARTY)
}

/// Notice shown under a full page of history
pub fn page_notice(count: usize, limit: usize) -> Option<String> {
    (limit > 0 && count >= limit).then(|| format!("Showing latest {limit} transactions"))
}

pub struct TransactionView<'a> {
    transaction: &'a Transaction,
    decimals: u8,
    symbol: &'a str,
}

impl<'a> TransactionView<'a> {
    /// `decimals` and `symbol` come from the contract being browsed
    pub fn new(transaction: &'a Transaction, decimals: u8, symbol: &'a str) -> Self {
        Self {
            transaction,
            decimals,
            symbol,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.transaction.transaction_type.as_str()
    }

    pub fn amount(&self) -> String {
        let amount = format_base_units(self.transaction.amount, self.decimals)
            .unwrap_or_else(|_| "0".to_string());
        let symbol = if self.symbol.is_empty() { "TOKENS" } else { self.symbol };
        format!("{amount} {symbol}")
    }

    /// Who was involved, phrased per transaction type
    pub fn parties(&self) -> Option<String> {
        let from = party_name(self.transaction.from_user.as_ref());
        let to = party_name(self.transaction.to_user.as_ref());
        match self.transaction.transaction_type {
            TransactionType::Transfer => Some(format!("From: {from} → To: {to}")),
            TransactionType::Mint => Some(format!("Minted to: {to}")),
            TransactionType::Burn => Some(format!("Burned from: {from}")),
            TransactionType::Approval => Some(format!("Owner: {from} → Spender: {to}")),
            TransactionType::Unknown => None,
        }
    }

    pub fn short_hash(&self) -> Option<String> {
        self.transaction
            .transaction_hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .map(|h| {
                let prefix: String = h.chars().take(SHORT_HASH_LEN).collect();
                format!("{prefix}...")
            })
    }

    pub fn date(&self) -> String {
        self.transaction.created_at.format("%Y-%m-%d").to_string()
    }

    pub fn time(&self) -> String {
        self.transaction.created_at.format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use chrono::{TimeZone, Utc};

    fn transaction(kind: TransactionType) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            token_contract_id: "c1".to_string(),
            transaction_type: kind,
            amount: U256::from(1_500_000u64),
            from_user_id: Some("u1".to_string()),
            to_user_id: Some("u2".to_string()),
            transaction_hash: Some("0xdeadbeefcafe".to_string()),
            block_number: Some(7),
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            token_contracts: None,
            from_user: Some(PartySummary {
                full_name: Some("Ana Reyes".to_string()),
                wallet_address: None,
            }),
            to_user: None,
        }
    }

    #[test]
    fn test_parties_per_type() {
        let cases = [
            (TransactionType::Transfer, Some("From: Ana Reyes → To: Unknown")),
            (TransactionType::Mint, Some("Minted to: Unknown")),
            (TransactionType::Burn, Some("Burned from: Ana Reyes")),
            (TransactionType::Approval, Some("Owner: Ana Reyes → Spender: Unknown")),
            (TransactionType::Unknown, None),
        ];
        for (kind, expected) in cases {
            let tx = transaction(kind);
            let view = TransactionView::new(&tx, 6, "PISO");
            assert_eq!(view.parties().as_deref(), expected);
        }
    }

    #[test]
    fn test_amount_hash_and_time() {
        let tx = transaction(TransactionType::Transfer);
        let view = TransactionView::new(&tx, 6, "");
        assert_eq!(view.kind(), "transfer");
        assert_eq!(view.amount(), "1.5 TOKENS");
        assert_eq!(view.short_hash().as_deref(), Some("0xdeadbe..."));
        assert_eq!(view.date(), "2024-03-09");
        assert_eq!(view.time(), "14:05:00");
    }

    #[test]
    fn test_page_notice() {
        assert_eq!(page_notice(49, 50), None);
        assert_eq!(
            page_notice(50, 50).as_deref(),
            Some("Showing latest 50 transactions")
        );
    }
}
