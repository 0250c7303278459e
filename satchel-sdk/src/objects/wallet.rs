use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Stable identifier of a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(pub Uuid);

impl std::fmt::Display for WalletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordResult {
    pub success: bool,
    pub failure_reason: Option<CompactString>,
}

/// Outcome of exporting transactions and contacts to CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPerformed {
    pub success: bool,
    pub transactions_file: Option<PathBuf>,
    pub contacts_file: Option<PathBuf>,
    pub failure_reason: Option<CompactString>,
}
