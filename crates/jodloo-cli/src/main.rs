//! Jodloo CLI - Personal finance toolkit
//!
//! Usage:
//!   jodloo init --user asha           Create a ledger
//!   jodloo loan plan --amount 1000 ... Compute a loan repayment plan
//!   jodloo budget overview            Category utilization this period
//!   jodloo import --file CSV          Import transactions

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let ledger = cli.ledger.as_path();
    let json = cli.json;

    match cli.command {
        Commands::Init {
            user,
            sample_budget,
        } => commands::cmd_init(ledger, &user, sample_budget, &config),
        Commands::Loan { action } => match action {
            LoanAction::Plan { terms } => commands::cmd_loan_plan(&terms, &config, json),
            LoanAction::Schedule {
                from,
                frequency,
                count,
            } => commands::cmd_loan_schedule(&from, &frequency, count, json),
            LoanAction::Overdue {
                from,
                frequency,
                now,
            } => commands::cmd_loan_overdue(&from, &frequency, now.as_deref(), json),
            LoanAction::Add {
                with,
                direction,
                purpose,
                terms,
            } => commands::cmd_loan_add(ledger, &with, &direction, &purpose, &terms, &config),
            LoanAction::Remove { id } => commands::cmd_loan_remove(ledger, id),
        },
        Commands::Loans => commands::cmd_loans(ledger, &config, json),
        Commands::Budget { action } => match action {
            BudgetAction::Overview { month, from, to } => commands::cmd_budget_overview(
                ledger,
                month.as_deref(),
                from.as_deref(),
                to.as_deref(),
                json,
            ),
            BudgetAction::Status => commands::cmd_budget_status(ledger, json),
            BudgetAction::List => commands::cmd_budget_list(ledger, json),
            BudgetAction::Create {
                name,
                categories,
                sample,
                reset,
                alert,
                invites,
            } => commands::cmd_budget_create(
                ledger,
                &name,
                &categories,
                sample,
                &reset,
                &alert,
                &invites,
                &config,
            ),
            BudgetAction::Activate { id } => commands::cmd_budget_activate(ledger, id),
        },
        Commands::Transactions { month, action } => match action {
            None => commands::cmd_transactions_list(ledger, month.as_deref(), json),
            Some(TransactionsAction::Add {
                kind,
                category,
                amount,
                account,
                date,
                note,
            }) => commands::cmd_transactions_add(
                ledger,
                &kind,
                &category,
                amount,
                &account,
                date.as_deref(),
                note,
            ),
            Some(TransactionsAction::Remove { id }) => {
                commands::cmd_transactions_remove(ledger, id)
            }
        },
        Commands::Expenses => commands::cmd_expenses(ledger, json),
        Commands::Notes { prefix } => commands::cmd_notes(ledger, &prefix, json),
        Commands::Goals { month, action } => match action {
            None => commands::cmd_goals_list(ledger, month.as_deref(), json),
            Some(GoalsAction::Add {
                name,
                amount,
                by,
                saved,
            }) => commands::cmd_goals_add(ledger, &name, amount, &by, saved),
            Some(GoalsAction::Save { id, amount }) => commands::cmd_goals_save(ledger, id, amount),
            Some(GoalsAction::Remove { id }) => commands::cmd_goals_remove(ledger, id),
        },
        Commands::Investments { month, action } => match action {
            None => commands::cmd_investments_list(ledger, month.as_deref(), json),
            Some(InvestmentsAction::Add {
                account,
                category,
                amount,
                note,
            }) => commands::cmd_investments_add(ledger, &account, &category, amount, note),
            Some(InvestmentsAction::Revalue { id, value }) => {
                commands::cmd_investments_revalue(ledger, id, value)
            }
            Some(InvestmentsAction::Remove { id }) => {
                commands::cmd_investments_remove(ledger, id)
            }
        },
        Commands::Networth => commands::cmd_networth(ledger, &config, json),
        Commands::Summary => commands::cmd_summary(ledger, &config, json),
        Commands::Import { file } => commands::cmd_import(ledger, &file),
        Commands::Plans => commands::cmd_plans(&config, json),
        Commands::Subscribe { plan } => commands::cmd_subscribe(ledger, &plan, &config),
    }
}
