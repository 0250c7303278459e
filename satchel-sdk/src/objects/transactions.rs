use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// An amount of bitcoin in satoshis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Satoshis(pub u64);

impl std::fmt::Display for Satoshis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sat", self.0)
    }
}

/// Result of building (but not yet broadcasting) a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCreation {
    /// Transaction id, absent if creation failed.
    pub txid: Option<CompactString>,
    pub amount: Satoshis,
    pub fee: Option<Satoshis>,
    pub destination: CompactString,
    pub note: Option<CompactString>,
    pub success: bool,
    pub failure_reason: Option<CompactString>,
}

/// Result of broadcasting a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinSent {
    pub destination: CompactString,
    pub amount: Satoshis,
    pub success: bool,
    pub failure_reason: Option<CompactString>,
}

/// Confidence level the network reports for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Unknown,
    Pending,
    Building,
    Dead,
}

/// A transaction observed on the network or in a block.
///
/// Emitted for every sighting, so these arrive in bursts during sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSeen {
    pub txid: CompactString,
    /// Number of blocks on top of the one containing the transaction.
    #[serde(default)]
    pub depth: u32,
    pub confidence: Confidence,
    #[serde(default)]
    pub coinbase: bool,
    pub amount: Satoshis,
}

impl TransactionSeen {
    /// True once the transaction is buried deep enough to be considered final.
    pub fn is_mature(&self) -> bool {
        self.confidence == Confidence::Building && self.depth >= 6
    }
}
