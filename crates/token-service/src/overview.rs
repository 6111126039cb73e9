//! Token overview card: metadata, supply and the user's share

use alloy_primitives::U256;
use token_backend::Backend;
use token_core::types::Balance;
use token_core::{format_base_units, TokenError};

use crate::facade::TokenService;

/// Bits kept when two amounts are reduced for a ratio
const RATIO_BITS: usize = 100;

/// `part / whole` as a float, exact enough for percentages at any magnitude
fn ratio(part: U256, whole: U256) -> Option<f64> {
    if part.is_zero() || whole.is_zero() {
        return None;
    }
    let shift = part.bit_len().max(whole.bit_len()).saturating_sub(RATIO_BITS);
    let part = u128::try_from(part >> shift).unwrap_or(u128::MAX);
    let whole = u128::try_from(whole >> shift).unwrap_or(u128::MAX);
    if whole == 0 {
        return None;
    }
    Some(part as f64 / whole as f64)
}

/// Minted share of the supply cap, rounded to a whole percent
pub fn supply_progress_percent(total_supply: U256, max_supply: U256) -> u64 {
    ratio(total_supply, max_supply)
        .map(|r| (r * 100.0).round() as u64)
        .unwrap_or(0)
}

/// Width of the supply progress bar in percent, capped at 100
pub fn supply_bar_width(total_supply: U256, max_supply: U256) -> f64 {
    ratio(total_supply, max_supply)
        .map(|r| (r * 100.0).min(100.0))
        .unwrap_or(0.0)
}

/// The holder's share of the circulating supply, to two decimals
pub fn holding_share_percent(balance: U256, total_supply: U256) -> f64 {
    ratio(balance, total_supply)
        .map(|r| (r * 10_000.0).round() / 100.0)
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenOverview {
    pub contract_id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub max_supply: U256,
    /// Failures of individual reads; their fields hold fallbacks
    pub errors: Vec<TokenError>,
}

impl TokenOverview {
    /// Read the contract's metadata and supply concurrently
    pub async fn load<B: Backend + ?Sized>(service: &TokenService<B>, contract_id: &str) -> Self {
        let (name, symbol, decimals, total_supply, max_supply) = tokio::join!(
            service.get_name(contract_id),
            service.get_symbol(contract_id),
            service.get_decimals(contract_id),
            service.get_total_supply(contract_id),
            service.get_max_supply(contract_id),
        );

        let errors = [
            name.error.clone(),
            symbol.error.clone(),
            decimals.error.clone(),
            total_supply.error.clone(),
            max_supply.error.clone(),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self {
            contract_id: contract_id.to_string(),
            name: name.data,
            symbol: symbol.data,
            decimals: decimals.data,
            total_supply: total_supply.data,
            max_supply: max_supply.data,
            errors,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_supply_display(&self) -> String {
        format_base_units(self.total_supply, self.decimals).unwrap_or_else(|_| "0".to_string())
    }

    pub fn max_supply_display(&self) -> String {
        format_base_units(self.max_supply, self.decimals).unwrap_or_else(|_| "0".to_string())
    }

    pub fn supply_progress_percent(&self) -> u64 {
        supply_progress_percent(self.total_supply, self.max_supply)
    }

    pub fn supply_bar_width(&self) -> f64 {
        supply_bar_width(self.total_supply, self.max_supply)
    }

    pub fn holding_share_percent(&self, balance: Option<&Balance>) -> f64 {
        balance
            .map(|b| holding_share_percent(b.balance, self.total_supply))
            .unwrap_or(0.0)
    }
}
