use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Health of the connection to an exchange rate provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeStatus {
    /// Rates are flowing normally.
    Ok,
    /// The provider could not be reached.
    ErrorConnection,
    /// The provider answered with something we could not use.
    ErrorFailedToLoadRate,
    /// No exchange is configured.
    NotInitialised,
}

/// Snapshot of the exchange rate provider state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSummary {
    pub status: ExchangeStatus,
    /// Provider name, e.g. "Bitstamp".
    pub provider: Option<CompactString>,
    /// Message key describing the failure, when `status` is an error.
    pub error_key: Option<CompactString>,
}

impl ExchangeSummary {
    pub fn ok(provider: impl Into<CompactString>) -> Self {
        Self {
            status: ExchangeStatus::Ok,
            provider: Some(provider.into()),
            error_key: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExchangeStatus::Ok
    }
}
