//! Import command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use jodloo_core::import::parse_csv;

use super::{open_ledger, save_ledger};

pub fn cmd_import(ledger_path: &Path, file: &Path) -> Result<()> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing from {}...", file.display());

    let mut ledger = open_ledger(ledger_path)?;

    let transactions = parse_csv(csv_file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    println!("   Found {} transactions", transactions.len());

    let stats = ledger.merge_imported(transactions);
    if stats.imported > 0 {
        save_ledger(&ledger, ledger_path)?;
    }

    println!("✅ Import complete!");
    println!("   Imported: {}", stats.imported);
    println!("   Skipped (duplicates): {}", stats.skipped);

    Ok(())
}
