//! Loan calculator and loan record commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveTime, Utc};
use jodloo_core::installments::{is_overdue, next_installment_date};
use jodloo_core::models::{Frequency, InterestType, LoanAgreement, LoanDirection, LoanTerms};
use jodloo_core::reports::{loan_portfolio, LoanDetail};
use jodloo_core::Config;
use serde_json::json;

use super::{open_ledger, parse_date_arg, print_json, save_ledger, truncate};
use crate::cli::LoanTermsArgs;

fn parse_frequency(value: &str) -> Result<Frequency> {
    value.parse().map_err(|e: String| anyhow::anyhow!(e))
}

/// Turn command-line loan terms into typed terms
pub fn parse_terms(args: &LoanTermsArgs) -> Result<LoanTerms> {
    let interest_type: InterestType = args.interest.parse()?;
    Ok(LoanTerms {
        principal: args.amount,
        interest_rate: args.rate,
        interest_type,
        date_given: parse_date_arg(&args.from, "--from")?,
        repayment_date: parse_date_arg(&args.to, "--to")?,
        frequency: parse_frequency(&args.frequency)?,
        installment_amount: args.installment,
    })
}

pub fn cmd_loan_plan(args: &LoanTermsArgs, config: &Config, json: bool) -> Result<()> {
    let terms = parse_terms(args)?;
    let engine = config.engine();
    let schedule = engine.schedule(&terms, Utc::now())?;

    if json {
        return print_json(&schedule);
    }

    println!();
    println!("🧮 Repayment Plan");
    println!(
        "   {:.2} at {}% {} interest, {} to {}",
        terms.principal, terms.interest_rate, terms.interest_type, terms.date_given, terms.repayment_date
    );
    println!("   ─────────────────────────────");
    println!("   Total payable:   {:>12.2}", schedule.total_payable);
    println!(
        "   Installments:    {:>12} ({})",
        schedule.installment_count, terms.frequency
    );
    println!("   Each:            {:>12.2}", schedule.installment_amount);
    if schedule.overdue {
        println!("   ⚠️  First installment period has already passed");
    }

    Ok(())
}

pub fn cmd_loan_schedule(from: &str, frequency: &str, count: u32, json: bool) -> Result<()> {
    let date_given = parse_date_arg(from, "--from")?;
    let frequency = parse_frequency(frequency)?;

    if count == 0 {
        tracing::warn!("--count 0 lists no installments");
    }
    let dates = (1..=count)
        .map(|i| next_installment_date(date_given, frequency, i))
        .collect::<jodloo_core::Result<Vec<_>>>()?;

    if json {
        return print_json(&dates);
    }

    println!();
    println!("📅 Installment Dates ({}, from {})", frequency, date_given);
    println!("   {:>4} │ {:10}", "#", "Due");
    println!("   ─────┼────────────");
    for (i, date) in dates.iter().enumerate() {
        println!("   {:>4} │ {}", i + 1, date);
    }

    Ok(())
}

pub fn cmd_loan_overdue(from: &str, frequency: &str, now: Option<&str>, json: bool) -> Result<()> {
    let date_given = parse_date_arg(from, "--from")?;
    let frequency = parse_frequency(frequency)?;
    let now = match now {
        Some(value) => parse_date_arg(value, "--now")?
            .and_time(NaiveTime::MIN)
            .and_utc(),
        None => Utc::now(),
    };

    let overdue = is_overdue(date_given, frequency, now);

    if json {
        return print_json(&json!({ "overdue": overdue }));
    }

    if overdue {
        println!("⚠️  Overdue: the first {} installment period has passed", frequency);
    } else {
        println!("✅ On time");
    }

    Ok(())
}

pub fn cmd_loan_add(
    ledger_path: &Path,
    with: &str,
    direction: &str,
    purpose: &str,
    args: &LoanTermsArgs,
    config: &Config,
) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let direction: LoanDirection = direction.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let terms = parse_terms(args)?;

    let loan = LoanAgreement::record(0, &ledger.user, with, direction, terms, purpose);
    let id = ledger
        .add_loan(loan, &config.engine())
        .context("Failed to record loan")?;
    save_ledger(&ledger, ledger_path)?;

    println!("✅ Recorded loan {} ({} {})", id, direction, with);
    Ok(())
}

pub fn cmd_loan_remove(ledger_path: &Path, id: i64) -> Result<()> {
    let mut ledger = open_ledger(ledger_path)?;
    let removed = ledger.remove_loan(id)?;
    save_ledger(&ledger, ledger_path)?;
    println!("🗑️  Removed loan {} ({})", removed.id, removed.purpose);
    Ok(())
}

fn print_loan_rows(title: &str, loans: &[LoanDetail]) {
    println!();
    println!("   {}", title);
    if loans.is_empty() {
        println!("   (none)");
        return;
    }
    println!(
        "   {:>4} │ {:15} │ {:>10} │ {:>9} │ {:>4} │ {:10}",
        "ID", "With", "Total", "Each", "Left", "Next due"
    );
    println!("   ─────┼─────────────────┼────────────┼───────────┼──────┼────────────");
    for loan in loans {
        let next = loan
            .next_installment_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:>4} │ {:15} │ {:>10.2} │ {:>9.2} │ {:>4} │ {}{}",
            loan.loan_id,
            truncate(&loan.counterparty, 15),
            loan.total_payable,
            loan.installment_amount,
            loan.installments_left,
            next,
            if loan.overdue { " ⚠️" } else { "" }
        );
    }
}

pub fn cmd_loans(ledger_path: &Path, config: &Config, json: bool) -> Result<()> {
    let ledger = open_ledger(ledger_path)?;
    let portfolio = loan_portfolio(&ledger.loans, &ledger.user, &config.engine(), Utc::now());

    if json {
        return print_json(&portfolio);
    }

    println!();
    println!("🤝 Loans for {}", ledger.user);
    println!("   ─────────────────────────────");
    println!("   To give:    {:>12.2}", portfolio.amount_to_give);
    println!("   To receive: {:>12.2}", portfolio.amount_to_receive);

    print_loan_rows("💸 You owe", &portfolio.next_installments);
    print_loan_rows("💰 Owed to you", &portfolio.next_receivables);

    let overdue = portfolio.overdue_installments.len() + portfolio.overdue_receivables.len();
    if overdue > 0 {
        println!();
        println!("⚠️  {} loans are past their first installment date", overdue);
    }

    Ok(())
}
