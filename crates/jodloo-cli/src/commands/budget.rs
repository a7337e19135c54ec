//! Budget command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use jodloo_core::budget::{aggregate, CategoryUtilization};
use jodloo_core::models::{AlertThreshold, BudgetCategory, DateWindow, ResetPeriod};
use jodloo_core::{reports, AccessLevel, Config, Ledger};

use super::{open_ledger, parse_date_arg, print_json, save_ledger, today, truncate};

fn active_budget_or_bail(ledger: &Ledger) -> Result<&jodloo_core::models::Budget> {
    ledger.active_budget().ok_or_else(|| {
        anyhow::anyhow!("No active budget. Create one with: jodloo budget create --name <name> --category Food=5000")
    })
}

/// Resolve the overview window: explicit dates, then month, then the budget's reset period
pub fn resolve_window(
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    reset_period: ResetPeriod,
) -> Result<DateWindow> {
    match (from, to) {
        (Some(from), Some(to)) => {
            let start = parse_date_arg(from, "--from")?;
            let end = parse_date_arg(to, "--to")?;
            if end <= start {
                anyhow::bail!("--to must be after --from");
            }
            Ok(DateWindow::new(start, end))
        }
        (Some(_), None) | (None, Some(_)) => anyhow::bail!("--from and --to must be given together"),
        (None, None) => match month {
            Some(month) => Ok(reports::month_window(month)?),
            None => Ok(reset_period.window(today())),
        },
    }
}

fn print_category_table(categories: &[CategoryUtilization]) {
    println!(
        "   {:20} │ {:>10} │ {:>10} │ {:>8} │ {:>10}",
        "Category", "Budget", "Used", "Used %", "Remaining"
    );
    println!("   ─────────────────────┼────────────┼────────────┼──────────┼────────────");
    for c in categories {
        println!(
            "   {:20} │ {:>10.2} │ {:>10.2} │ {:>7}% │ {:>10.2}",
            truncate(&c.category, 20),
            c.total_amount,
            c.used_amount,
            c.used_percentage,
            c.remaining
        );
    }
}

pub fn cmd_budget_overview(
    ledger_path: &Path,
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    json: bool,
) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    ledger.subscription.require_active(Utc::now())?;
    let budget = active_budget_or_bail(&ledger)?;

    let window = resolve_window(month, from, to, budget.reset_period)?;
    tracing::debug!("Budget overview window {} to {}", window.start, window.end);
    let usage = aggregate(&budget.categories, &ledger.transactions, window);

    if json {
        return print_json(&usage);
    }

    println!();
    println!("📊 {} ({})", budget.name, budget.reset_period);
    println!("   Window: {} to {} (exclusive)", window.start, window.end);
    println!("   ─────────────────────────────────────────────────────────────");

    print_category_table(&usage.categories);

    println!();
    println!(
        "   Budget: {:.2}   Used: {:.2}",
        usage.total_budget, usage.total_used
    );
    println!(
        "   Income: {:.2}   Expense: {:.2}   Net: {:.2}",
        usage.total_income, usage.total_expense, usage.net_total
    );

    let over: Vec<_> = usage
        .categories
        .iter()
        .filter(|c| c.remaining < 0.0)
        .map(|c| c.category.as_str())
        .collect();
    if !over.is_empty() {
        println!();
        println!("⚠️  Over budget: {}", over.join(", "));
    }

    Ok(())
}

pub fn cmd_budget_status(ledger_path: &Path, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let budget = active_budget_or_bail(&ledger)?;
    let summary = budget.summary();

    if json {
        return print_json(&summary);
    }

    println!();
    println!("📒 {} (budget {})", summary.budget_name, summary.budget_id);
    println!(
        "   Used {:.2} of {:.2} ({}%)",
        summary.total_used, summary.total_amount, summary.percentage_used
    );
    println!("   ─────────────────────────────────────────────────────────────");
    print_category_table(&summary.categories);

    Ok(())
}

pub fn cmd_budget_list(ledger_path: &Path, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let budgets: Vec<_> = ledger.visible_budgets().collect();

    if json {
        return print_json(&budgets);
    }

    if budgets.is_empty() {
        println!("No budgets yet.");
        return Ok(());
    }

    println!();
    println!(
        "   {:>4} │ {:20} │ {:12} │ {:>10} │ {:8}",
        "ID", "Name", "Resets", "Total", "Role"
    );
    println!("   ─────┼──────────────────────┼──────────────┼────────────┼─────────");
    for b in budgets {
        let marker = if ledger.active_budget == Some(b.id) { " ★" } else { "" };
        let role = b
            .collaborators
            .role_of(&ledger.user)
            .map(|r| r.as_str())
            .unwrap_or("-");
        println!(
            "   {:>4} │ {:20} │ {:12} │ {:>10.2} │ {}{}",
            b.id,
            truncate(&b.name, 20),
            b.reset_period.as_str(),
            b.total_amount(),
            role,
            marker
        );
    }

    Ok(())
}

/// Parse `NAME=AMOUNT`
fn parse_category(value: &str) -> Result<BudgetCategory> {
    let (name, amount) = value
        .split_once('=')
        .with_context(|| format!("Invalid category {} (use NAME=AMOUNT)", value))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount for category {}", name))?;
    Ok(BudgetCategory::new(name.trim(), amount))
}

/// Parse `USER` or `USER:ROLE`
fn parse_invite(value: &str) -> Result<(String, Option<AccessLevel>)> {
    match value.split_once(':') {
        Some((user, role)) => {
            let role: AccessLevel = role.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            Ok((user.trim().to_string(), Some(role)))
        }
        None => Ok((value.trim().to_string(), None)),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_budget_create(
    ledger_path: &Path,
    name: &str,
    categories: &[String],
    sample: bool,
    reset: &str,
    alert: &str,
    invites: &[String],
    config: &Config,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    ledger.subscription.require_active(Utc::now())?;

    let reset_period: ResetPeriod = reset.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let alert_threshold: AlertThreshold =
        alert.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut caps = if sample {
        config.sample_categories.clone()
    } else {
        Vec::new()
    };
    for c in categories {
        caps.push(parse_category(c)?);
    }

    let invited = invites
        .iter()
        .map(|i| parse_invite(i))
        .collect::<Result<Vec<_>>>()?;
    let invited: Vec<(&str, Option<AccessLevel>)> =
        invited.iter().map(|(u, r)| (u.as_str(), *r)).collect();

    let id = ledger
        .create_budget(name, reset_period, alert_threshold, caps, &invited)
        .context("Failed to create budget")?;
    save_ledger(&ledger, ledger_path)?;

    println!("✅ Created budget {} ({})", id, name);
    if ledger.active_budget == Some(id) {
        println!("   ★ Set as active budget");
    }
    Ok(())
}

pub fn cmd_budget_activate(ledger_path: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    ledger.subscription.require_active(Utc::now())?;
    ledger.activate_budget(id)?;
    save_ledger(&ledger, ledger_path)?;
    println!("✅ Budget {} is now active", id);
    Ok(())
}
