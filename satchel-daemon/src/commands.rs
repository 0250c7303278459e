//! Producer commands read from stdin.
//!
//! Each line is one JSON object tagged with the event kind, mirroring the
//! dispatcher's `fire_*` operations:
//!
//! ```json
//! {"kind":"transaction_seen","seen":{"txid":"ab12","confidence":"pending","amount":1500}}
//! {"kind":"shutdown_requested","shutdown_type":"soft"}
//! ```

use compact_str::CompactString;
use rust_decimal::Decimal;
use satchel_core::dispatch::EventDispatcher;
use satchel_sdk::objects::{
    BitcoinNetworkSummary, BitcoinSent, ChangePasswordResult, ExchangeSummary, ExportPerformed,
    HistoryEntry, SecuritySummary, ShutdownType, TransactionCreation, TransactionSeen, WalletId,
};
use serde::Deserialize;
use std::path::PathBuf;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProducerCommand {
    ExchangeRateChanged {
        rate: Decimal,
        currency: CompactString,
        #[serde(default)]
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
    TransactionSeen {
        seen: TransactionSeen,
    },
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

impl ProducerCommand {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line).map(Some)
    }

    /// Hand the command to the matching facade operation.
    pub fn apply(self, dispatcher: &EventDispatcher) {
        match self {
            ProducerCommand::ExchangeRateChanged {
                rate,
                currency,
                rate_provider,
                expires,
            } => dispatcher.fire_exchange_rate_changed(rate, currency, rate_provider, expires),
            ProducerCommand::ExchangeStatusChanged { summary } => {
                dispatcher.fire_exchange_status_changed(summary)
            }
            ProducerCommand::TransactionCreated { creation } => {
                dispatcher.fire_transaction_created(creation)
            }
            ProducerCommand::BitcoinSent { sent } => dispatcher.fire_bitcoin_sent(sent),
            ProducerCommand::ChangePasswordResult { result } => {
                dispatcher.fire_change_password_result(result)
            }
            ProducerCommand::TransactionSeen { seen } => dispatcher.fire_transaction_seen(seen),
            ProducerCommand::BitcoinNetworkChanged { summary } => {
                dispatcher.fire_bitcoin_network_changed(summary)
            }
            ProducerCommand::BackupWalletLoaded {
                wallet_id,
                backup_file,
            } => dispatcher.fire_backup_wallet_loaded(wallet_id, backup_file),
            ProducerCommand::SecurityAlert { summary } => dispatcher.fire_security_alert(summary),
            ProducerCommand::HistoryChanged { entry } => dispatcher.fire_history_changed(entry),
            ProducerCommand::ShutdownRequested { shutdown_type } => {
                dispatcher.fire_shutdown(shutdown_type)
            }
            ProducerCommand::ConfigurationChanged => dispatcher.fire_configuration_changed(),
            ProducerCommand::ExportPerformed { export } => {
                dispatcher.fire_export_performed(export)
            }
        }
    }
}
