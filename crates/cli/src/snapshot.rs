//! JSON account/balance snapshots consumed by the runner.

use anyhow::{Context, Result};
use clap::Args;
use refnet_referral::InMemoryBalanceBook;
use refnet_types::{AccountId, AccountRecord, Amount};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot selection shared by the commands that read one.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Snapshot file (JSON) with accounts and balances
    #[arg(long, value_name = "PATH")]
    pub snapshot: PathBuf,
    /// Restrict the run to the subtree of this account (0 runs the whole forest)
    #[arg(long)]
    pub root: Option<AccountId>,
    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub account: AccountId,
    pub amount: Amount,
}

/// Accounts in source order plus their balances in the reference asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    /// Balance book for the snapshot; repeated entries for one account add up.
    pub fn balance_book(&self) -> InMemoryBalanceBook {
        InMemoryBalanceBook::from_entries(self.balances.iter().map(|e| (e.account, e.amount)))
    }
}
