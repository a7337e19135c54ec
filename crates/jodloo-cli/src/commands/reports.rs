//! Goals, investments, net worth and summary commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use jodloo_core::reports::{financial_summary, goal_summary, investment_summary, net_worth};
use jodloo_core::Config;

use super::{month_or_current, open_ledger, parse_date_arg, print_json, save_ledger, today, truncate};

// --- Goals ---

pub fn cmd_goals_list(ledger_path: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let window = month_or_current(month)?;
    let summary = goal_summary(&ledger.goals, window, today());

    if json {
        return print_json(&summary);
    }

    println!();
    println!("🎯 Savings Goals");

    if summary.goals.is_empty() {
        println!("   No active goals for this period.");
    } else {
        println!(
            "   {:>4} │ {:20} │ {:>10} │ {:>10} │ {:>7} │ {:>9}",
            "ID", "Goal", "Target", "Saved", "Reached", "Days left"
        );
        println!("   ─────┼──────────────────────┼────────────┼────────────┼─────────┼──────────");
        for g in &summary.goals {
            println!(
                "   {:>4} │ {:20} │ {:>10.2} │ {:>10.2} │ {:>6}% │ {:>9}",
                g.id,
                truncate(g.name.as_deref().unwrap_or("(unnamed)"), 20),
                g.goal_amount,
                g.money_saved,
                g.percentage_reached,
                g.days_left
            );
        }
        println!();
        println!(
            "   Saved {:.2} of {:.2} ({:.2}%)",
            summary.total_money_saved, summary.total_goals_amount, summary.percentage_saved
        );
    }

    if !summary.expired.is_empty() {
        let ids: Vec<String> = summary.expired.iter().map(|id| id.to_string()).collect();
        println!();
        println!("⏰ Past their target date: {}", ids.join(", "));
    }

    Ok(())
}

pub fn cmd_goals_add(
    ledger_path: &Path,
    name: &str,
    amount: f64,
    by: &str,
    saved: f64,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let target_date = parse_date_arg(by, "--by")?;
    if target_date < today() {
        anyhow::bail!("Target date {} is in the past", target_date);
    }

    let name = name.trim();
    let note = (!name.is_empty()).then(|| name.to_string());
    let id = ledger
        .add_goal(note, target_date, amount, saved, Utc::now())
        .context("Failed to add goal")?;
    save_ledger(&ledger, ledger_path)?;

    println!("✅ Added goal {} ({:.2} by {})", id, amount, target_date);
    Ok(())
}

pub fn cmd_goals_save(ledger_path: &Path, id: i64, amount: f64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let goal = ledger.save_towards_goal(id, amount)?;
    let (saved, target) = (goal.money_saved, goal.goal_amount);
    save_ledger(&ledger, ledger_path)?;

    println!("💰 Goal {}: {:.2} of {:.2} saved", id, saved, target);
    if saved >= target {
        println!("🎉 Goal reached!");
    }
    Ok(())
}

pub fn cmd_goals_remove(ledger_path: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    ledger.remove_goal(id)?;
    save_ledger(&ledger, ledger_path)?;
    println!("🗑️  Removed goal {}", id);
    Ok(())
}

// --- Investments ---

pub fn cmd_investments_list(ledger_path: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let window = month_or_current(month)?;
    let summary = investment_summary(&ledger.investments, window);

    if json {
        return print_json(&summary);
    }

    println!();
    println!("📈 Investments");

    if summary.investments.is_empty() {
        println!("   No holdings added in this period.");
        return Ok(());
    }

    println!(
        "   {:>4} │ {:14} │ {:10} │ {:>10} │ {:>10} │ {:>10}",
        "ID", "Account", "Category", "Invested", "Value", "P/L"
    );
    println!("   ─────┼────────────────┼────────────┼────────────┼────────────┼────────────");
    for i in &summary.investments {
        println!(
            "   {:>4} │ {:14} │ {:10} │ {:>10.2} │ {:>10.2} │ {:>+10.2}",
            i.id,
            truncate(&i.account, 14),
            truncate(&i.category, 10),
            i.invested_amount,
            i.current_value,
            i.profit_loss
        );
    }
    println!();
    println!(
        "   Invested: {:.2}   Value: {:.2}   P/L: {:+.2}",
        summary.total_invested_amount, summary.total_current_value, summary.total_profit_loss
    );

    Ok(())
}

pub fn cmd_investments_add(
    ledger_path: &Path,
    account: &str,
    category: &str,
    amount: f64,
    note: Option<String>,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let id = ledger
        .add_investment(account, category, amount, note)
        .context("Failed to add investment")?;
    save_ledger(&ledger, ledger_path)?;
    println!("✅ Added investment {} ({:.2} in {})", id, amount, category);
    Ok(())
}

pub fn cmd_investments_revalue(ledger_path: &Path, id: i64, value: f64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let profit_loss = ledger.revalue_investment(id, value)?.profit_loss();
    save_ledger(&ledger, ledger_path)?;
    println!("✅ Investment {} now worth {:.2} (P/L {:+.2})", id, value, profit_loss);
    Ok(())
}

pub fn cmd_investments_remove(ledger_path: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    ledger.remove_investment(id)?;
    save_ledger(&ledger, ledger_path)?;
    println!("🗑️  Removed investment {}", id);
    Ok(())
}

// --- Overviews ---

pub fn cmd_networth(ledger_path: &Path, config: &Config, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let worth = net_worth(
        &ledger.investments,
        &ledger.loans,
        &ledger.transactions,
        &ledger.user,
        &config.engine(),
        Utc::now(),
    );

    if json {
        return print_json(&worth);
    }

    println!();
    println!("🏦 Net Worth");
    println!("   ─────────────────────────────");
    println!("   Investments:   {:>12.2}", worth.total_investments);
    println!("   Receivables:   {:>12.2}", worth.total_receivables);
    println!("   Liabilities:   {:>12.2}", -worth.total_liabilities);
    println!("   ─────────────────────────────");
    println!("   Net worth:     {:>12.2}", worth.net_worth);
    println!();
    println!(
        "   Cash flow: {} income ({:.2}), {} expenses ({:.2}), net {:.2}",
        worth.transactions.income_count,
        worth.transactions.total_income,
        worth.transactions.expense_count,
        worth.transactions.total_expense,
        worth.transactions.net
    );

    Ok(())
}

pub fn cmd_summary(ledger_path: &Path, config: &Config, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let summary = financial_summary(&ledger, &config.engine(), Utc::now());

    if json {
        return print_json(&summary);
    }

    println!();
    println!("📊 Summary for {}", ledger.user);
    println!("   ═══════════════════════════════════════════════");

    match &summary.budget {
        Some(b) => println!(
            "   📒 {}: {:.2} of {:.2} used ({}%)",
            b.budget_name, b.total_used, b.total_amount, b.percentage_used
        ),
        None => println!("   📒 No active budget"),
    }

    let saved: f64 = summary.goals.iter().map(|g| g.money_saved).sum();
    let target: f64 = summary.goals.iter().map(|g| g.goal_amount).sum();
    println!(
        "   🎯 {} goals: {:.2} of {:.2} saved",
        summary.goals.len(),
        saved,
        target
    );

    let value: f64 = summary.investments.iter().map(|i| i.current_value).sum();
    let profit_loss: f64 = summary.investments.iter().map(|i| i.profit_loss).sum();
    println!(
        "   📈 {} investments worth {:.2} (P/L {:+.2})",
        summary.investments.len(),
        value,
        profit_loss
    );

    println!(
        "   🤝 Loans: {:.2} to give, {:.2} to receive",
        summary.loans.amount_to_give, summary.loans.amount_to_receive
    );
    let overdue =
        summary.loans.overdue_installments.len() + summary.loans.overdue_receivables.len();
    if overdue > 0 {
        println!("   ⚠️  {} overdue", overdue);
    }

    Ok(())
}
