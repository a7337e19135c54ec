//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Jodloo - Budgets, loans and goals from the command line
#[derive(Parser)]
#[command(name = "jodloo")]
#[command(about = "Personal finance toolkit: budgets, udhaar loans, goals and investments", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(long, default_value = "jodloo.json", global = true)]
    pub ledger: PathBuf,

    /// Config file (defaults to ~/.local/share/jodloo/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty ledger
    Init {
        /// Name of the ledger owner
        #[arg(short, long)]
        user: String,

        /// Also create a starter budget from the configured sample categories
        #[arg(long)]
        sample_budget: bool,
    },

    /// Loan calculator and loan records
    Loan {
        #[command(subcommand)]
        action: LoanAction,
    },

    /// Loan portfolio: what you owe and what you are owed
    Loans,

    /// Manage budgets (overview, list, create, activate)
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Transactions grouped by day
    Transactions {
        /// Month to show (MM-YYYY, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// All-time income, expense and expense by category
    Expenses,

    /// Suggest previously used notes starting with a prefix
    Notes {
        /// Prefix to match (case-insensitive)
        prefix: String,
    },

    /// Savings goals
    Goals {
        /// Month the goals were created in (MM-YYYY, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Investment holdings
    Investments {
        /// Month the holdings were added in (MM-YYYY, defaults to the current month)
        #[arg(long)]
        month: Option<String>,

        #[command(subcommand)]
        action: Option<InvestmentsAction>,
    },

    /// Net worth from investments and loans
    Networth,

    /// Budget, goals, investments and loans at a glance
    Summary,

    /// Import transactions from CSV (Date,Type,Account,Category,Amount,Note)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List subscription plans
    Plans,

    /// Activate or renew a subscription
    Subscribe {
        /// Plan key (see `jodloo plans`)
        plan: String,
    },
}

#[derive(Subcommand)]
pub enum LoanAction {
    /// Compute the repayment plan for loan terms
    Plan {
        #[command(flatten)]
        terms: LoanTermsArgs,
    },

    /// List installment due dates
    Schedule {
        /// Date the loan was given (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Installment frequency: weekly, monthly, yearly
        #[arg(long, default_value = "monthly")]
        frequency: String,

        /// Number of installments to list
        #[arg(long, default_value = "12")]
        count: u32,
    },

    /// Check whether the first installment period has passed
    Overdue {
        /// Date the loan was given (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Installment frequency: weekly, monthly, yearly
        #[arg(long, default_value = "monthly")]
        frequency: String,

        /// Evaluate as of this date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Record a loan in the ledger
    Add {
        /// The other party
        #[arg(long)]
        with: String,

        /// got (you borrowed) or given (you lent)
        #[arg(long)]
        direction: String,

        /// What the loan is for
        #[arg(long, default_value = "")]
        purpose: String,

        #[command(flatten)]
        terms: LoanTermsArgs,
    },

    /// Delete a loan record
    Remove {
        /// Loan ID
        id: i64,
    },
}

/// Loan terms shared by `loan plan` and `loan add`
#[derive(clap::Args)]
pub struct LoanTermsArgs {
    /// Principal amount
    #[arg(long)]
    pub amount: f64,

    /// Interest rate, percent per year
    #[arg(long, default_value = "0")]
    pub rate: f64,

    /// Interest type: simple or compound
    #[arg(long, default_value = "simple")]
    pub interest: String,

    /// Date given (YYYY-MM-DD)
    #[arg(long)]
    pub from: String,

    /// Repayment date (YYYY-MM-DD)
    #[arg(long)]
    pub to: String,

    /// Installment frequency: weekly, monthly, yearly
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Expected installment amount, checked against the computed one
    #[arg(long)]
    pub installment: Option<f64>,
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Category utilization over a window (subscribers only)
    Overview {
        /// Month (MM-YYYY); defaults to the budget's reset period
        #[arg(long)]
        month: Option<String>,

        /// Custom start date (YYYY-MM-DD) - overrides month
        #[arg(long)]
        from: Option<String>,

        /// Custom end date, exclusive (YYYY-MM-DD) - overrides month
        #[arg(long)]
        to: Option<String>,
    },

    /// Usage recorded on the active budget
    Status,

    /// List budgets you can see
    List,

    /// Create a budget (subscribers only)
    Create {
        /// Budget name
        #[arg(long)]
        name: String,

        /// Category caps as NAME=AMOUNT (repeatable)
        #[arg(long = "category", value_name = "NAME=AMOUNT")]
        categories: Vec<String>,

        /// Use the configured sample categories
        #[arg(long)]
        sample: bool,

        /// Reset period, e.g. "Every Month", every_week, weekdays
        #[arg(long, default_value = "Every Month")]
        reset: String,

        /// Alert threshold, e.g. "Every 20%", remaining_30, none
        #[arg(long, default_value = "None")]
        alert: String,

        /// Collaborators as USER or USER:ROLE (repeatable, role defaults to viewer)
        #[arg(long = "invite", value_name = "USER[:ROLE]")]
        invites: Vec<String>,
    },

    /// Make a budget the active one (subscribers only)
    Activate {
        /// Budget ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// Record an income or expense
    Add {
        /// income or expense
        #[arg(long = "type")]
        kind: String,

        /// Category
        #[arg(long)]
        category: String,

        /// Amount
        #[arg(long)]
        amount: f64,

        /// Account (cash, bank, card, ...)
        #[arg(long, default_value = "Cash")]
        account: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Note
        #[arg(long)]
        note: Option<String>,
    },

    /// Delete a transaction
    Remove {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// Add a savings goal
    Add {
        /// Goal name
        #[arg(long)]
        name: String,

        /// Target amount
        #[arg(long)]
        amount: f64,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        by: String,

        /// Amount already saved
        #[arg(long, default_value = "0")]
        saved: f64,
    },

    /// Put money towards a goal
    Save {
        /// Goal ID
        id: i64,

        /// Amount saved
        amount: f64,
    },

    /// Delete a goal
    Remove {
        /// Goal ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum InvestmentsAction {
    /// Add a holding
    Add {
        /// Account or platform
        #[arg(long)]
        account: String,

        /// Category (stocks, gold, fd, ...)
        #[arg(long)]
        category: String,

        /// Amount invested
        #[arg(long)]
        amount: f64,

        /// Note
        #[arg(long)]
        note: Option<String>,
    },

    /// Update the current value of a holding
    Revalue {
        /// Investment ID
        id: i64,

        /// Current value
        value: f64,
    },

    /// Delete a holding
    Remove {
        /// Investment ID
        id: i64,
    },
}
