//! Event type definitions.

use compact_str::CompactString;
use rust_decimal::Decimal;
use satchel_sdk::objects::{
    BitcoinNetworkSummary, BitcoinSent, ChangePasswordResult, ExchangeSummary, ExportPerformed,
    HistoryEntry, SecuritySummary, ShutdownType, TransactionCreation, TransactionSeen, WalletId,
};
use serde::Serialize;
use std::path::PathBuf;
use time::OffsetDateTime;

/// The closed set of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ExchangeRateChanged,
    ExchangeStatusChanged,
    TransactionCreated,
    BitcoinSent,
    ChangePasswordResult,
    TransactionSeen,
    SlowTransactionSeen,
    BitcoinNetworkChanged,
    BackupWalletLoaded,
    SecurityAlert,
    HistoryChanged,
    ShutdownRequested,
    ConfigurationChanged,
    ExportPerformed,
}

impl EventKind {
    pub const ALL: [EventKind; 14] = [
        EventKind::ExchangeRateChanged,
        EventKind::ExchangeStatusChanged,
        EventKind::TransactionCreated,
        EventKind::BitcoinSent,
        EventKind::ChangePasswordResult,
        EventKind::TransactionSeen,
        EventKind::SlowTransactionSeen,
        EventKind::BitcoinNetworkChanged,
        EventKind::BackupWalletLoaded,
        EventKind::SecurityAlert,
        EventKind::HistoryChanged,
        EventKind::ShutdownRequested,
        EventKind::ConfigurationChanged,
        EventKind::ExportPerformed,
    ];

    /// Position of this kind in [`EventKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ExchangeRateChanged => "exchange_rate_changed",
            EventKind::ExchangeStatusChanged => "exchange_status_changed",
            EventKind::TransactionCreated => "transaction_created",
            EventKind::BitcoinSent => "bitcoin_sent",
            EventKind::ChangePasswordResult => "change_password_result",
            EventKind::TransactionSeen => "transaction_seen",
            EventKind::SlowTransactionSeen => "slow_transaction_seen",
            EventKind::BitcoinNetworkChanged => "bitcoin_network_changed",
            EventKind::BackupWalletLoaded => "backup_wallet_loaded",
            EventKind::SecurityAlert => "security_alert",
            EventKind::HistoryChanged => "history_changed",
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::ConfigurationChanged => "configuration_changed",
            EventKind::ExportPerformed => "export_performed",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification for the presentation layer.
///
/// Serialized as an internally-tagged JSON object keyed on `"kind"`:
///
/// ```json
/// {"kind":"transaction_seen","seen":{"txid":"...","depth":0, ...}}
/// {"kind":"slow_transaction_seen"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoreEvent {
    /// A new local-currency rate against bitcoin, e.g. rate 1000 means
    /// 1000 local units buy one bitcoin.
    ExchangeRateChanged {
        rate: Decimal,
        currency: CompactString,
        /// Absent when the provider is unknown.
        rate_provider: Option<CompactString>,
        #[serde(with = "time::serde::rfc3339")]
        expires: OffsetDateTime,
    },
    ExchangeStatusChanged {
        summary: ExchangeSummary,
    },
    TransactionCreated {
        creation: TransactionCreation,
    },
    BitcoinSent {
        sent: BitcoinSent,
    },
    ChangePasswordResult {
        result: ChangePasswordResult,
    },
    /// Raw sighting of a transaction. Posted for every occurrence.
    TransactionSeen {
        seen: TransactionSeen,
    },
    /// One or more transactions were seen during the last debounce window.
    SlowTransactionSeen,
    BitcoinNetworkChanged {
        summary: BitcoinNetworkSummary,
    },
    BackupWalletLoaded {
        wallet_id: WalletId,
        backup_file: PathBuf,
    },
    SecurityAlert {
        summary: SecuritySummary,
    },
    HistoryChanged {
        entry: HistoryEntry,
    },
    ShutdownRequested {
        shutdown_type: ShutdownType,
    },
    ConfigurationChanged,
    ExportPerformed {
        export: ExportPerformed,
    },
}

impl CoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            CoreEvent::ExchangeRateChanged { .. } => EventKind::ExchangeRateChanged,
            CoreEvent::ExchangeStatusChanged { .. } => EventKind::ExchangeStatusChanged,
            CoreEvent::TransactionCreated { .. } => EventKind::TransactionCreated,
            CoreEvent::BitcoinSent { .. } => EventKind::BitcoinSent,
            CoreEvent::ChangePasswordResult { .. } => EventKind::ChangePasswordResult,
            CoreEvent::TransactionSeen { .. } => EventKind::TransactionSeen,
            CoreEvent::SlowTransactionSeen => EventKind::SlowTransactionSeen,
            CoreEvent::BitcoinNetworkChanged { .. } => EventKind::BitcoinNetworkChanged,
            CoreEvent::BackupWalletLoaded { .. } => EventKind::BackupWalletLoaded,
            CoreEvent::SecurityAlert { .. } => EventKind::SecurityAlert,
            CoreEvent::HistoryChanged { .. } => EventKind::HistoryChanged,
            CoreEvent::ShutdownRequested { .. } => EventKind::ShutdownRequested,
            CoreEvent::ConfigurationChanged => EventKind::ConfigurationChanged,
            CoreEvent::ExportPerformed { .. } => EventKind::ExportPerformed,
        }
    }
}
