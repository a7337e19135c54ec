//! Subscription plan commands

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use jodloo_core::Config;

use super::{open_ledger, print_json, save_ledger};

pub fn cmd_plans(config: &Config, json: bool) -> Result<()> {
    let plans: Vec<_> = config.plans.values().collect();

    if json {
        return print_json(&plans);
    }

    println!();
    println!("💳 Subscription Plans");
    println!(
        "   {:10} │ {:12} │ {:>9} │ {:>9} │ {:8}",
        "Plan", "Duration", "Monthly", "Total", "Currency"
    );
    println!("   ───────────┼──────────────┼───────────┼───────────┼─────────");
    for p in plans {
        println!(
            "   {:10} │ {:12} │ {:>9.2} │ {:>9.2} │ {}",
            p.key,
            p.duration,
            p.monthly_price,
            p.total_price(),
            p.currency
        );
    }
    println!();
    println!("Subscribe with: jodloo subscribe <plan>");

    Ok(())
}

pub fn cmd_subscribe(ledger_path: &Path, plan: &str, config: &Config) -> Result<()> {
    let plan = config.plan(plan)?;
    let mut ledger = open_ledger(ledger_path)?;

    let till = ledger.subscription.extend(plan, Utc::now())?;
    save_ledger(&ledger, ledger_path)?;

    println!(
        "✅ Subscribed to {} ({:.2} {})",
        plan.duration,
        plan.total_price(),
        plan.currency
    );
    println!("   Active until {}", till.format("%Y-%m-%d"));
    Ok(())
}
