pub mod exchange;
pub mod history;
pub mod network;
pub mod security;
pub mod shutdown;
pub mod transactions;
pub mod wallet;

pub use exchange::{ExchangeStatus, ExchangeSummary};
pub use history::HistoryEntry;
pub use network::{BitcoinNetworkSummary, NetworkStatus};
pub use security::{AlertType, SecuritySummary, Severity};
pub use shutdown::ShutdownType;
pub use transactions::{BitcoinSent, Confidence, Satoshis, TransactionCreation, TransactionSeen};
pub use wallet::{ChangePasswordResult, ExportPerformed, WalletId};
