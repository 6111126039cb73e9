//! Token accounting facade and the dashboard workflows built on it.

pub mod dashboard;
pub mod facade;
pub mod forms;
pub mod history;
pub mod outcome;
pub mod overview;
pub mod session;

pub use dashboard::TokenDashboard;
pub use facade::TokenService;
pub use forms::{ApprovalForm, SubmitOutcome, TransferForm};
pub use history::{page_notice, TransactionView};
pub use outcome::Outcome;
pub use overview::TokenOverview;
pub use session::{Authenticator, Session, SignUpOutcome, SignUpRequest};
