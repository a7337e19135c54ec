//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_ledger` / `save_ledger` - Shared utilities to read and write the ledger
//! - `load_config` - Resolve the config file
//! - `cmd_init` - Create a ledger

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use jodloo_core::models::{AlertThreshold, ResetPeriod};
use jodloo_core::{Config, Ledger};
use serde::Serialize;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load config")
}

pub fn open_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        anyhow::bail!(
            "Ledger not found: {}. Create one with: jodloo init --user <name>",
            path.display()
        );
    }
    let ledger =
        Ledger::load(path).with_context(|| format!("Failed to open ledger {}", path.display()))?;
    tracing::debug!(
        "Loaded ledger for {} ({} transactions, {} loans)",
        ledger.user,
        ledger.transactions.len(),
        ledger.loans.len()
    );
    Ok(ledger)
}

pub fn save_ledger(ledger: &Ledger, path: &Path) -> Result<()> {
    ledger
        .save(path)
        .with_context(|| format!("Failed to save ledger {}", path.display()))
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date_arg(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date: {} (use YYYY-MM-DD)", flag, value))
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn cmd_init(path: &Path, user: &str, sample_budget: bool, config: &Config) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Ledger already exists: {}", path.display());
    }
    if user.trim().is_empty() {
        anyhow::bail!("A user name is required");
    }

    println!("🔧 Creating ledger at {}...", path.display());

    let mut ledger = Ledger::new(user.trim());

    if sample_budget {
        let id = ledger
            .create_budget(
                "Starter Budget",
                ResetPeriod::EveryMonth,
                AlertThreshold::Every20,
                config.sample_categories.clone(),
                &[],
            )
            .context("Failed to create starter budget")?;
        println!(
            "   Created budget {} with {} sample categories",
            id,
            config.sample_categories.len()
        );
    }

    save_ledger(&ledger, path)?;

    println!("✅ Ledger created for {}!", ledger.user);
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: jodloo import --file statement.csv");
    println!("  2. Record a loan: jodloo loan add --with ravi --direction given --amount 1000 --from 2024-01-01 --to 2025-01-01");
    println!("  3. Subscribe to unlock budgets: jodloo plans");

    Ok(())
}
