mod allowance;
mod balance;
mod contract;
mod profile;
mod transaction;
pub mod wire;

pub use allowance::Allowance;
pub use balance::Balance;
pub use contract::{ContractSummary, TokenContract};
pub use profile::{AuthGrant, AuthUser, PartySummary, SignUpMetadata, UserProfile};
pub use transaction::{Transaction, TransactionType};
pub use wire::WireAmount;
