//! Transaction command implementations

use std::path::Path;

use anyhow::{Context, Result};
use jodloo_core::models::{NewTransaction, TransactionType};
use jodloo_core::reports::{self, expense_overview, group_by_day, note_suggestions};

use super::{open_ledger, parse_date_arg, print_json, save_ledger, today, truncate};

/// `MM-YYYY`, or the current month
pub fn month_or_current(month: Option<&str>) -> Result<jodloo_core::models::DateWindow> {
    match month {
        Some(m) => Ok(reports::month_window(m)?),
        None => Ok(reports::current_month_window(today())),
    }
}

pub fn cmd_transactions_list(ledger_path: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let window = month_or_current(month)?;
    let grouped = group_by_day(&ledger.transactions, window);

    if json {
        return print_json(&grouped);
    }

    println!();
    println!("📋 Transactions {} to {}", window.start, window.end.pred_opt().unwrap_or(window.end));

    if grouped.days.is_empty() {
        println!("   No transactions in this period.");
        return Ok(());
    }

    for day in &grouped.days {
        println!();
        println!(
            "   {}   +{:.2} / -{:.2}",
            day.date.format("%a %d %b"),
            day.total_income,
            day.total_expense
        );
        println!("   ──────────────────────────────────────────────────────────────────");
        for t in &day.transactions {
            let sign = match t.kind {
                TransactionType::Income => "+",
                TransactionType::Expense => "-",
            };
            println!(
                "   {:>4} │ {:7} │ {:16} │ {}{:>10.2} │ {}",
                t.id,
                t.kind.as_str(),
                truncate(&t.category, 16),
                sign,
                t.amount,
                truncate(t.note.as_deref().unwrap_or(""), 20)
            );
        }
    }

    println!();
    println!(
        "   Income: {:.2}   Expense: {:.2}   Net: {:.2}",
        grouped.total_income, grouped.total_expense, grouped.total
    );

    Ok(())
}

pub fn cmd_transactions_add(
    ledger_path: &Path,
    kind: &str,
    category: &str,
    amount: f64,
    account: &str,
    date: Option<&str>,
    note: Option<String>,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;

    let kind: TransactionType = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let date = match date {
        Some(d) => parse_date_arg(d, "--date")?,
        None => today(),
    };

    let recorded = ledger
        .add_transaction(NewTransaction {
            date,
            kind,
            account: account.to_string(),
            category: category.to_string(),
            amount,
            note,
            import_hash: None,
        })
        .context("Failed to record transaction")?;
    save_ledger(&ledger, ledger_path)?;

    println!("✅ Recorded {} {} ({:.2} {})", kind, recorded.id, amount, category);
    if let Some(alert) = recorded.alert {
        println!("🔔 {}", alert.message);
    }
    Ok(())
}

pub fn cmd_transactions_remove(ledger_path: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let removed = ledger.remove_transaction(id)?;
    save_ledger(&ledger, ledger_path)?;
    println!(
        "🗑️  Removed transaction {} ({} {:.2})",
        removed.id, removed.category, removed.amount
    );
    Ok(())
}

pub fn cmd_expenses(ledger_path: &Path, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let overview = expense_overview(&ledger.transactions);

    if json {
        return print_json(&overview);
    }

    println!();
    println!("💸 Expenses by Category");
    println!("   ─────────────────────────────");
    for c in &overview.categories {
        println!("   {:20} {:>12.2}", truncate(&c.category, 20), c.amount);
    }
    println!("   ─────────────────────────────");
    println!("   Total income:  {:>12.2}", overview.total_income);
    println!("   Total expense: {:>12.2}", overview.total_expense);

    Ok(())
}

pub fn cmd_notes(ledger_path: &Path, prefix: &str, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let notes = note_suggestions(&ledger.transactions, prefix)?;

    if json {
        return print_json(&notes);
    }

    if notes.is_empty() {
        println!("No notes start with \"{}\"", prefix);
    }
    for note in notes {
        println!("{}", note);
    }
    Ok(())
}
