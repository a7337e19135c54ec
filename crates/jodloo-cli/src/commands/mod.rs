//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_ledger, save_ledger, load_config)
//! - `budget` - Budget commands (overview, status, list, create, activate)
//! - `import` - CSV import
//! - `loans` - Loan calculator and loan records
//! - `reports` - Goals, investments, net worth and summary
//! - `subscription` - Plans and subscribing
//! - `transactions` - Transaction commands (list, add, remove, expenses, notes)

pub mod budget;
pub mod core;
pub mod import;
pub mod loans;
pub mod reports;
pub mod subscription;
pub mod transactions;

// Re-export command functions for main.rs
pub use budget::*;
pub use core::*;
pub use import::*;
pub use loans::*;
pub use reports::*;
pub use subscription::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
