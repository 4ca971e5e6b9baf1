//! Referral bonus command line runner
//!
//! Runs the referral bonus computation over a JSON account snapshot and prints
//! the payout instructions. Applying the payouts is left to the caller.

mod config;
mod snapshot;

use crate::config::CliConfig;
use crate::snapshot::{Snapshot, SnapshotArgs};
use anyhow::Result;
use clap::{Parser, Subcommand};
use refnet_referral::{distribute, RankEngine, ReferralParams, ReferralTree};
use refnet_types::{AccountId, Amount, Rank, ReferralInfo};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "refnet")]
#[command(about = "Referral bonus distribution over account snapshots", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); REFNET_* environment variables take precedence
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute payout instructions for a snapshot
    Scan(SnapshotArgs),
    /// Show the aggregates and standing of every node
    Tree {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Only show this account
        #[arg(long)]
        account: Option<AccountId>,
    },
    /// Print the effective referral parameters
    Params,
}

/// One node of the `tree` report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct NodeReport {
    account_id: AccountId,
    parent: Option<AccountId>,
    depth: u32,
    balance: Amount,
    level_1_partners: u32,
    level_1_sum: Amount,
    level_2_partners: u32,
    all_partners: u32,
    all_sum: Amount,
    rank: Rank,
    bonus_percent: String,
    bonus: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;
    init_logging(&config)?;

    match cli.command {
        Commands::Scan(args) => handle_scan(&args, &config),
        Commands::Tree { snapshot, account } => handle_tree(&snapshot, account, &config),
        Commands::Params => {
            println!("{}", render_json(&config.params, true)?);
            Ok(())
        }
    }
}

fn handle_scan(args: &SnapshotArgs, config: &CliConfig) -> Result<()> {
    let payouts = scan_payouts(args, &config.params)?;
    println!("{}", render_json(&payouts, args.pretty)?);
    Ok(())
}

fn handle_tree(args: &SnapshotArgs, account: Option<AccountId>, config: &CliConfig) -> Result<()> {
    let report = tree_report(args, account, &config.params)?;
    println!("{}", render_json(&report, args.pretty)?);
    Ok(())
}

fn scan_payouts(args: &SnapshotArgs, params: &ReferralParams) -> Result<Vec<ReferralInfo>> {
    let snapshot = Snapshot::load(&args.snapshot)?;
    let balances = snapshot.balance_book();

    let distribution = distribute(snapshot.accounts, &balances, args.root, params)?;
    info!(
        target: "refnet",
        "Snapshot {}: {} accounts, {} payouts totalling {}",
        args.snapshot.display(),
        distribution.stats.accounts_seen,
        distribution.stats.qualifying,
        distribution.stats.total_quantity
    );

    Ok(distribution.payouts)
}

fn tree_report(
    args: &SnapshotArgs,
    account: Option<AccountId>,
    params: &ReferralParams,
) -> Result<Vec<NodeReport>> {
    params.validate()?;

    let snapshot = Snapshot::load(&args.snapshot)?;
    let balances = snapshot.balance_book();
    let tree = ReferralTree::build(snapshot.accounts, &balances, args.root, params)?;
    let rankings = RankEngine::new(params).assign(&tree);

    if let Some(account) = &account {
        tree.leaf_of(account)?;
    }

    let report = tree
        .ranked(&rankings)
        .filter(|ranked| account.map_or(true, |a| ranked.leaf.account_id == a))
        .map(|ranked| {
            let leaf = ranked.leaf;
            NodeReport {
                account_id: leaf.account_id,
                parent: tree
                    .parent(ranked.id)
                    .and_then(|p| tree.leaf(p))
                    .map(|p| p.account_id),
                depth: tree.depth(ranked.id).unwrap_or(0),
                balance: leaf.balance,
                level_1_partners: leaf.level_1_partners,
                level_1_sum: leaf.level_1_sum,
                level_2_partners: leaf.level_2_partners,
                all_partners: leaf.all_partners,
                all_sum: leaf.all_sum,
                rank: ranked.rank(),
                bonus_percent: ranked.bonus().to_string(),
                bonus: ranked.bonus_value(params),
            }
        })
        .collect();

    Ok(report)
}

fn render_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(output)
}

fn init_logging(config: &CliConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // stdout carries the JSON output; logs go to stderr.
    if config.log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}
