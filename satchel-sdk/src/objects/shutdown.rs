use serde::{Deserialize, Serialize};

/// How aggressively the application should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownType {
    /// Close wallets and services but keep the process alive.
    Soft,
    /// Stop everything and exit.
    Hard,
}

impl std::fmt::Display for ShutdownType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownType::Soft => write!(f, "soft"),
            ShutdownType::Hard => write!(f, "hard"),
        }
    }
}
