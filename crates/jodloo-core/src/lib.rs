//! Jodloo Core Library
//!
//! Shared functionality for the Jodloo personal finance toolkit:
//! - Installment engine for peer-to-peer loans ("udhaar")
//! - Budget utilization aggregator, spend guard and alert thresholds
//! - Reports over transactions, goals, investments and loans
//! - Shared-budget collaborators and subscription gating
//! - JSON ledger files and CSV transaction import

pub mod budget;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod import;
pub mod installments;
pub mod ledger;
pub mod models;
pub mod reports;
pub mod subscription;

pub use budget::{
    aggregate, check_spend, format_percentage, BudgetAlert, BudgetSummary, BudgetUtilization,
    CategoryUtilization,
};
pub use collaborators::{AccessLevel, Collaborator, Collaborators};
pub use config::Config;
pub use error::{Error, Result};
pub use installments::{
    is_overdue, next_installment_date, CountingConvention, InstallmentConfig, InstallmentEngine,
    InstallmentPlan, LoanStatus, YearBasis,
};
pub use ledger::{Ledger, MergeStats, Recorded};
pub use subscription::{SubscriptionPlan, UserSubscription};
