use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Coarse state of the peer-to-peer network connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    NotInitialised,
    Connecting,
    /// Block chain download in progress; see `percent`.
    Downloading,
    Connected,
    Failed,
}

/// Progress report from the network listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinNetworkSummary {
    pub status: NetworkStatus,
    /// Sync progress in percent, 0 when unknown.
    #[serde(default)]
    pub percent: u8,
    #[serde(default)]
    pub peer_count: u32,
    pub message: Option<CompactString>,
}

impl BitcoinNetworkSummary {
    pub fn downloading(percent: u8, peer_count: u32) -> Self {
        Self {
            status: NetworkStatus::Downloading,
            percent: percent.min(100),
            peer_count,
            message: None,
        }
    }
}
