//! Budget utilization aggregator
//!
//! Given budget categories and dated transactions, computes how much of each
//! category has been consumed in a window and the overall income, expense and
//! net totals. The aggregator never mutates its inputs and never fails: a
//! category with a zero cap reports `0.00%` and overspending reports more than
//! 100%.
//!
//! Also home to the spend guard that callers run before recording an expense
//! against a category, reset-period windows and alert threshold crossings.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    AlertThreshold, Budget, BudgetCategory, DateWindow, ResetPeriod, Transaction, TransactionType,
};

/// Consumption of one budget category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryUtilization {
    pub category: String,
    pub total_amount: f64,
    pub used_amount: f64,
    /// `used / amount * 100` with two decimals, `"0.00"` for a zero cap
    pub used_percentage: String,
    /// Share of the whole budget this category was allocated
    pub percentage_of_total: String,
    pub remaining: f64,
}

/// Snapshot of budget consumption and cash flow over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetUtilization {
    pub window: DateWindow,
    pub total_budget: f64,
    pub total_used: f64,
    pub categories: Vec<CategoryUtilization>,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_total: f64,
}

/// Usage recorded on the budget itself (accumulated `used_amount`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget_id: i64,
    pub budget_name: String,
    pub total_amount: f64,
    pub total_used: f64,
    pub percentage_used: String,
    pub categories: Vec<CategoryUtilization>,
}

/// An alert produced when a spend crosses the budget's alert threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub threshold: AlertThreshold,
    pub used_percentage: f64,
    pub message: String,
}

/// `part / whole * 100` with two decimals, `"0.00"` when `whole` is not positive
pub fn format_percentage(part: f64, whole: f64) -> String {
    if whole > 0.0 {
        format!("{:.2}", part * 100.0 / whole)
    } else {
        "0.00".to_string()
    }
}

/// Aggregate category consumption and cash flow over `[window.start, window.end)`.
pub fn aggregate(
    categories: &[BudgetCategory],
    transactions: &[Transaction],
    window: DateWindow,
) -> BudgetUtilization {
    let in_window: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| window.contains(t.date))
        .collect();

    let mut expenses_by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for t in &in_window {
        match t.kind {
            TransactionType::Income => total_income += t.amount,
            TransactionType::Expense => {
                total_expense += t.amount;
                *expenses_by_category.entry(t.category.as_str()).or_insert(0.0) += t.amount;
            }
        }
    }

    let total_budget: f64 = categories.iter().map(|c| c.amount).sum();

    let utilization: Vec<CategoryUtilization> = categories
        .iter()
        .map(|c| {
            let used = expenses_by_category
                .get(c.name.as_str())
                .copied()
                .unwrap_or(0.0);
            category_utilization(c, used, total_budget)
        })
        .collect();

    let total_used: f64 = utilization.iter().map(|c| c.used_amount).sum();

    debug!(
        "Aggregated {} of {} transactions over {} categories",
        in_window.len(),
        transactions.len(),
        categories.len()
    );

    BudgetUtilization {
        window,
        total_budget,
        total_used,
        categories: utilization,
        total_income,
        total_expense,
        net_total: total_income - total_expense,
    }
}

fn category_utilization(
    category: &BudgetCategory,
    used: f64,
    total_budget: f64,
) -> CategoryUtilization {
    CategoryUtilization {
        category: category.name.clone(),
        total_amount: category.amount,
        used_amount: used,
        used_percentage: format_percentage(used, category.amount),
        percentage_of_total: format_percentage(category.amount, total_budget),
        remaining: category.amount - used,
    }
}

/// Reject a spend that does not fit in what is left of the category
pub fn check_spend(category: &BudgetCategory, amount: f64) -> Result<()> {
    let available = category.remaining();
    if available < amount {
        return Err(Error::InsufficientBudget {
            category: category.name.clone(),
            available,
            requested: amount,
        });
    }
    Ok(())
}

impl BudgetCategory {
    /// Add a spend to the accumulated usage. Run `check_spend` first.
    pub fn record_spend(&mut self, amount: f64) {
        self.used_amount += amount;
    }

    /// Take a spend back out of the usage, never going below zero
    pub fn revert_spend(&mut self, amount: f64) {
        self.used_amount = (self.used_amount - amount).max(0.0);
    }
}

impl Budget {
    /// Summary of the usage accumulated on the categories themselves
    pub fn summary(&self) -> BudgetSummary {
        let total_amount = self.total_amount();
        let total_used: f64 = self.categories.iter().map(|c| c.used_amount).sum();
        BudgetSummary {
            budget_id: self.id,
            budget_name: self.name.clone(),
            total_amount,
            total_used,
            percentage_used: format_percentage(total_used, total_amount),
            categories: self
                .categories
                .iter()
                .map(|c| category_utilization(c, c.used_amount, total_amount))
                .collect(),
        }
    }

    /// Validate and record an expense against one of the categories
    pub fn spend(&mut self, category: &str, amount: f64) -> Result<()> {
        let cat = self
            .category_mut(category)
            .ok_or_else(|| Error::NotFound(format!("No budget category found for {}", category)))?;
        check_spend(cat, amount)?;
        cat.record_spend(amount);
        Ok(())
    }
}

impl ResetPeriod {
    /// The window the budget is currently accumulating over
    pub fn window(&self, today: NaiveDate) -> DateWindow {
        // Clamp at the calendar bounds instead of overflowing
        let plus = |date: NaiveDate, days: u64| {
            date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
        };
        let monday = today
            .checked_sub_days(Days::new(today.weekday().num_days_from_monday() as u64))
            .unwrap_or(NaiveDate::MIN);
        match self {
            Self::EveryDay => DateWindow::new(today, plus(today, 1)),
            Self::EveryWeek => DateWindow::new(monday, plus(monday, 7)),
            Self::Weekdays => DateWindow::new(monday, plus(monday, 5)),
            Self::Weekend => DateWindow::new(plus(monday, 5), plus(monday, 7)),
            Self::EveryMonth => DateWindow::month_of(today),
            Self::EveryYear => DateWindow::year_of(today),
        }
    }
}

impl AlertThreshold {
    /// The alert triggered by usage going from `used_before` to `used_after`
    /// against a cap of `amount`, if any.
    pub fn crossed(&self, amount: f64, used_before: f64, used_after: f64) -> Option<BudgetAlert> {
        if amount <= 0.0 || used_after <= used_before {
            return None;
        }
        let before = used_before * 100.0 / amount;
        let after = used_after * 100.0 / amount;

        let message = match self {
            Self::None => return None,
            Self::Every10 | Self::Every20 | Self::Every30 | Self::Every50 => {
                let step = match self {
                    Self::Every10 => 10.0,
                    Self::Every20 => 20.0,
                    Self::Every30 => 30.0,
                    _ => 50.0,
                };
                let reached = (after / step).floor();
                if reached <= (before / step).floor() || reached < 1.0 {
                    return None;
                }
                format!("Budget usage reached {:.0}%", reached * step)
            }
            Self::Remaining20 | Self::Remaining30 => {
                let limit = if *self == Self::Remaining20 { 20.0 } else { 30.0 };
                let remaining_before = 100.0 - before;
                let remaining_after = 100.0 - after;
                if !(remaining_before > limit && remaining_after <= limit) {
                    return None;
                }
                format!("Only {:.0}% of the budget remains", remaining_after.max(0.0))
            }
        };

        Some(BudgetAlert {
            threshold: *self,
            used_percentage: after,
            message,
        })
    }
}
