//! Reports over ledger data
//!
//! Every report is a pure function of already-loaded records plus the
//! current time. Nothing here mutates or persists.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use regex::RegexBuilder;
use serde::Serialize;
use tracing::warn;

use crate::budget::{format_percentage, BudgetSummary};
use crate::error::{Error, Result};
use crate::installments::InstallmentEngine;
use crate::ledger::Ledger;
use crate::models::{
    DateWindow, Frequency, Goal, Investment, LoanAgreement, Transaction, TransactionType,
};

/// Parse a `MM-YYYY` month selector into its window
pub fn month_window(month_year: &str) -> Result<DateWindow> {
    let invalid = || {
        Error::InvalidData(format!(
            "Invalid month-year format: {}. Please use MM-YYYY format.",
            month_year
        ))
    };

    let (month, year) = month_year.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(1900..=2100).contains(&year) {
        return Err(invalid());
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok(DateWindow::month_of(first))
}

pub fn current_month_window(today: NaiveDate) -> DateWindow {
    DateWindow::month_of(today)
}

// --- Transactions ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub transactions: Vec<Transaction>,
    pub total_income: f64,
    pub total_expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionsByDay {
    pub days: Vec<DayGroup>,
    pub total_income: f64,
    pub total_expense: f64,
    pub total: f64,
}

/// Transactions in the window grouped by date, oldest first
pub fn group_by_day(transactions: &[Transaction], window: DateWindow) -> TransactionsByDay {
    let mut by_date: BTreeMap<NaiveDate, DayGroup> = BTreeMap::new();
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for t in transactions.iter().filter(|t| window.contains(t.date)) {
        let day = by_date.entry(t.date).or_insert_with(|| DayGroup {
            date: t.date,
            transactions: Vec::new(),
            total_income: 0.0,
            total_expense: 0.0,
        });
        match t.kind {
            TransactionType::Income => {
                day.total_income += t.amount;
                total_income += t.amount;
            }
            TransactionType::Expense => {
                day.total_expense += t.amount;
                total_expense += t.amount;
            }
        }
        day.transactions.push(t.clone());
    }

    TransactionsByDay {
        days: by_date.into_values().collect(),
        total_income,
        total_expense,
        total: total_income - total_expense,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseOverview {
    pub total_income: f64,
    pub total_expense: f64,
    pub categories: Vec<CategoryExpense>,
}

/// All-time income, expense and expense per category (by category name)
pub fn expense_overview(transactions: &[Transaction]) -> ExpenseOverview {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for t in transactions {
        match t.kind {
            TransactionType::Income => total_income += t.amount,
            TransactionType::Expense => {
                total_expense += t.amount;
                *by_category.entry(t.category.as_str()).or_insert(0.0) += t.amount;
            }
        }
    }

    ExpenseOverview {
        total_income,
        total_expense,
        categories: by_category
            .into_iter()
            .map(|(category, amount)| CategoryExpense {
                category: category.to_string(),
                amount,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionSummary {
    pub income_count: usize,
    pub expense_count: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
}

pub fn transaction_summary(transactions: &[Transaction]) -> TransactionSummary {
    let mut summary = TransactionSummary::default();
    for t in transactions {
        match t.kind {
            TransactionType::Income => {
                summary.income_count += 1;
                summary.total_income += t.amount;
            }
            TransactionType::Expense => {
                summary.expense_count += 1;
                summary.total_expense += t.amount;
            }
        }
    }
    summary.net = summary.total_income - summary.total_expense;
    summary
}

/// Distinct notes starting with `prefix`, case-insensitive, in first-seen order
pub fn note_suggestions(transactions: &[Transaction], prefix: &str) -> Result<Vec<String>> {
    if prefix.trim().is_empty() {
        return Err(Error::InvalidData("A note prefix is required".into()));
    }
    let pattern = RegexBuilder::new(&format!("^{}", regex::escape(prefix)))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::InvalidData(format!("Invalid note prefix: {}", e)))?;

    let mut seen = BTreeSet::new();
    Ok(transactions
        .iter()
        .filter_map(|t| t.note.as_deref())
        .filter(|note| pattern.is_match(note))
        .filter(|note| seen.insert(*note))
        .map(|note| note.to_string())
        .collect())
}

// --- Goals and investments ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub id: i64,
    pub name: Option<String>,
    pub target_date: NaiveDate,
    pub goal_amount: f64,
    pub money_saved: f64,
    pub percentage_reached: String,
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalSummary {
    pub goals: Vec<GoalProgress>,
    /// Goals created in the window whose target date has passed
    pub expired: Vec<i64>,
    pub total_goals_amount: f64,
    pub total_money_saved: f64,
    pub percentage_saved: f64,
}

fn goal_progress(goal: &Goal, today: NaiveDate) -> GoalProgress {
    GoalProgress {
        id: goal.id,
        name: goal.note.clone(),
        target_date: goal.target_date,
        goal_amount: goal.goal_amount,
        money_saved: goal.money_saved,
        percentage_reached: format_percentage(goal.money_saved, goal.goal_amount),
        days_left: (goal.target_date - today).num_days(),
    }
}

/// Goals created in `window`. Goals past their target date are listed as
/// expired and left out of the totals.
pub fn goal_summary(goals: &[Goal], window: DateWindow, today: NaiveDate) -> GoalSummary {
    let mut active = Vec::new();
    let mut expired = Vec::new();

    for goal in goals
        .iter()
        .filter(|g| window.contains(g.created_at.date_naive()))
    {
        let progress = goal_progress(goal, today);
        if progress.days_left >= 0 {
            active.push(progress);
        } else {
            expired.push(goal.id);
        }
    }

    let total_goals_amount: f64 = active.iter().map(|g| g.goal_amount).sum();
    let total_money_saved: f64 = active.iter().map(|g| g.money_saved).sum();
    let percentage_saved = if total_goals_amount > 0.0 {
        total_money_saved / total_goals_amount * 100.0
    } else {
        0.0
    };

    GoalSummary {
        goals: active,
        expired,
        total_goals_amount,
        total_money_saved,
        percentage_saved,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentPerformance {
    pub id: i64,
    pub account: String,
    pub category: String,
    pub invested_amount: f64,
    pub current_value: f64,
    pub profit_loss: f64,
    /// Current value as a percentage of the invested amount
    pub percentage_reached: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentSummary {
    pub investments: Vec<InvestmentPerformance>,
    pub total_invested_amount: f64,
    pub total_current_value: f64,
    pub total_profit_loss: f64,
}

fn investment_performance(investment: &Investment) -> InvestmentPerformance {
    InvestmentPerformance {
        id: investment.id,
        account: investment.account.clone(),
        category: investment.category.clone(),
        invested_amount: investment.invested_amount,
        current_value: investment.current_value,
        profit_loss: investment.profit_loss(),
        percentage_reached: format_percentage(
            investment.current_value,
            investment.invested_amount,
        ),
    }
}

/// Holdings created in `window`, with profit/loss per holding and in total
pub fn investment_summary(investments: &[Investment], window: DateWindow) -> InvestmentSummary {
    let items: Vec<InvestmentPerformance> = investments
        .iter()
        .filter(|i| window.contains(i.created_at.date_naive()))
        .map(investment_performance)
        .collect();

    let total_invested_amount: f64 = items.iter().map(|i| i.invested_amount).sum();
    let total_current_value: f64 = items.iter().map(|i| i.current_value).sum();

    InvestmentSummary {
        investments: items,
        total_invested_amount,
        total_current_value,
        total_profit_loss: total_current_value - total_invested_amount,
    }
}

// --- Loans ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanDetail {
    pub loan_id: i64,
    /// The other party
    pub counterparty: String,
    pub purpose: String,
    pub frequency: Frequency,
    pub interest_rate: f64,
    pub total_payable: f64,
    pub installment_amount: f64,
    pub installments_left: u32,
    pub amount_paid: f64,
    pub next_installment_date: Option<NaiveDate>,
    pub overdue: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoanPortfolio {
    pub amount_to_give: f64,
    pub amount_to_receive: f64,
    /// Loans where the user is the borrower
    pub next_installments: Vec<LoanDetail>,
    /// Loans where the user is the lender
    pub next_receivables: Vec<LoanDetail>,
    pub overdue_installments: Vec<LoanDetail>,
    pub overdue_receivables: Vec<LoanDetail>,
}

/// Split `user`'s loans into what they owe and what they are owed.
///
/// Loans the user is not a party to are skipped, as are loans whose stored
/// terms no longer produce a plan.
pub fn loan_portfolio(
    loans: &[LoanAgreement],
    user: &str,
    engine: &InstallmentEngine,
    now: DateTime<Utc>,
) -> LoanPortfolio {
    let mut portfolio = LoanPortfolio::default();

    for loan in loans {
        let is_lender = loan.lender == user;
        let is_borrower = loan.borrower == user;
        if !is_lender && !is_borrower {
            continue;
        }

        let status = match engine.loan_status(loan, now) {
            Ok(status) => status,
            Err(e) => {
                warn!("Skipping loan {}: {}", loan.id, e);
                continue;
            }
        };

        let detail = LoanDetail {
            loan_id: loan.id,
            counterparty: if is_lender {
                loan.borrower.clone()
            } else {
                loan.lender.clone()
            },
            purpose: loan.purpose.clone(),
            frequency: loan.terms.frequency,
            interest_rate: loan.terms.interest_rate,
            total_payable: status.plan.total_payable,
            installment_amount: loan
                .terms
                .installment_amount
                .unwrap_or(status.plan.installment_amount),
            installments_left: status.installments_left,
            amount_paid: status.amount_paid,
            next_installment_date: status.next_installment_date,
            overdue: status.overdue,
        };

        if is_lender {
            portfolio.amount_to_receive += detail.total_payable;
            if detail.overdue {
                portfolio.overdue_receivables.push(detail.clone());
            }
            portfolio.next_receivables.push(detail);
        } else {
            portfolio.amount_to_give += detail.total_payable;
            if detail.overdue {
                portfolio.overdue_installments.push(detail.clone());
            }
            portfolio.next_installments.push(detail);
        }
    }

    portfolio
}

// --- Net worth and summary ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorth {
    pub total_investments: f64,
    pub total_receivables: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
    pub transactions: TransactionSummary,
}

/// Investments at current value plus money owed to the user, minus what
/// the user owes, alongside the all-time cash flow
pub fn net_worth(
    investments: &[Investment],
    loans: &[LoanAgreement],
    transactions: &[Transaction],
    user: &str,
    engine: &InstallmentEngine,
    now: DateTime<Utc>,
) -> NetWorth {
    let total_investments: f64 = investments.iter().map(|i| i.current_value).sum();
    let portfolio = loan_portfolio(loans, user, engine, now);

    NetWorth {
        total_investments,
        total_receivables: portfolio.amount_to_receive,
        total_liabilities: portfolio.amount_to_give,
        net_worth: total_investments + portfolio.amount_to_receive - portfolio.amount_to_give,
        transactions: transaction_summary(transactions),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// `None` when no budget is active
    pub budget: Option<BudgetSummary>,
    pub goals: Vec<GoalProgress>,
    pub investments: Vec<InvestmentPerformance>,
    pub loans: LoanPortfolio,
}

/// Everything in the ledger at a glance. Unlike the windowed goal report,
/// expired goals are included here with a negative `days_left`.
pub fn financial_summary(
    ledger: &Ledger,
    engine: &InstallmentEngine,
    now: DateTime<Utc>,
) -> FinancialSummary {
    let today = now.date_naive();
    FinancialSummary {
        budget: ledger.active_budget().map(|b| b.summary()),
        goals: ledger
            .goals
            .iter()
            .map(|g| goal_progress(g, today))
            .collect(),
        investments: ledger
            .investments
            .iter()
            .map(investment_performance)
            .collect(),
        loans: loan_portfolio(&ledger.loans, &ledger.user, engine, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterestType, LoanDirection, LoanTerms};
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn tx(id: i64, d: NaiveDate, kind: TransactionType, category: &str, amount: f64, note: Option<&str>) -> Transaction {
        Transaction {
            id,
            date: d,
            kind,
            account: "Cash".to_string(),
            category: category.to_string(),
            amount,
            note: note.map(|n| n.to_string()),
            import_hash: None,
            charged_budget: None,
        }
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            tx(1, date(2024, 3, 2), TransactionType::Expense, "Food", 120.0, Some("Lunch at office")),
            tx(2, date(2024, 3, 1), TransactionType::Income, "Salary", 5000.0, Some("March pay")),
            tx(3, date(2024, 3, 2), TransactionType::Expense, "Transport", 40.0, Some("lunch cab")),
            tx(4, date(2024, 4, 1), TransactionType::Expense, "Food", 60.0, Some("Lunch at office")),
            tx(5, date(2024, 3, 9), TransactionType::Expense, "Bills", 300.0, None),
        ]
    }

    fn loan(id: i64, user: &str, other: &str, direction: LoanDirection) -> LoanAgreement {
        let terms = LoanTerms {
            principal: 1000.0,
            interest_rate: 12.0,
            interest_type: InterestType::Simple,
            date_given: date(2024, 1, 1),
            repayment_date: date(2025, 1, 1),
            frequency: Frequency::Monthly,
            installment_amount: None,
        };
        LoanAgreement::record(id, user, other, direction, terms, "rent")
    }

    #[test]
    fn test_month_window() {
        let window = month_window("02-2024").unwrap();
        assert_eq!(window, DateWindow::new(date(2024, 2, 1), date(2024, 3, 1)));

        let december = month_window("12-2099").unwrap();
        assert_eq!(december.end, date(2100, 1, 1));
    }

    #[test]
    fn test_month_window_rejects_out_of_range() {
        for bad in ["13-2024", "00-2024", "01-1899", "01-2101", "2024-01", "March", "1-"] {
            assert!(
                matches!(month_window(bad), Err(Error::InvalidData(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_group_by_day() {
        let march = month_window("03-2024").unwrap();
        let grouped = group_by_day(&sample_transactions(), march);

        assert_eq!(grouped.days.len(), 3);
        assert_eq!(grouped.days[0].date, date(2024, 3, 1));
        assert_eq!(grouped.days[1].transactions.len(), 2);
        assert_eq!(grouped.days[1].total_expense, 160.0);
        assert_eq!(grouped.total_income, 5000.0);
        assert_eq!(grouped.total_expense, 460.0);
        assert_eq!(grouped.total, 4540.0);
    }

    #[test]
    fn test_group_by_day_empty_window() {
        let grouped = group_by_day(&sample_transactions(), month_window("01-2020").unwrap());
        assert!(grouped.days.is_empty());
        assert_eq!(grouped.total, 0.0);
    }

    #[test]
    fn test_expense_overview_sorted_by_category() {
        let overview = expense_overview(&sample_transactions());
        let names: Vec<_> = overview.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Bills", "Food", "Transport"]);
        assert_eq!(overview.categories[1].amount, 180.0);
        assert_eq!(overview.total_income, 5000.0);
        assert_eq!(overview.total_expense, 520.0);
    }

    #[test]
    fn test_transaction_summary() {
        let summary = transaction_summary(&sample_transactions());
        assert_eq!(summary.income_count, 1);
        assert_eq!(summary.expense_count, 4);
        assert_eq!(summary.net, 4480.0);
    }

    #[test]
    fn test_note_suggestions() {
        let notes = note_suggestions(&sample_transactions(), "LUNCH").unwrap();
        assert_eq!(notes, vec!["Lunch at office", "lunch cab"]);

        assert!(note_suggestions(&sample_transactions(), "dinner").unwrap().is_empty());
        assert!(note_suggestions(&sample_transactions(), " ").is_err());
    }

    #[test]
    fn test_note_suggestions_escapes_input() {
        let mut txs = sample_transactions();
        txs.push(tx(9, date(2024, 3, 3), TransactionType::Expense, "Food", 1.0, Some("(misc) tea")));
        assert_eq!(note_suggestions(&txs, "(misc").unwrap(), vec!["(misc) tea"]);
        assert!(note_suggestions(&txs, ".*").unwrap().is_empty());
    }

    #[test]
    fn test_goal_summary_drops_expired() {
        let goals = vec![
            Goal {
                id: 1,
                note: Some("Bike".into()),
                target_date: date(2024, 6, 1),
                goal_amount: 1000.0,
                money_saved: 250.0,
                created_at: at(2024, 3, 1),
            },
            Goal {
                id: 2,
                note: Some("Concert".into()),
                target_date: date(2024, 3, 5),
                goal_amount: 500.0,
                money_saved: 500.0,
                created_at: at(2024, 3, 2),
            },
            Goal {
                id: 3,
                note: None,
                target_date: date(2024, 12, 1),
                goal_amount: 800.0,
                money_saved: 0.0,
                created_at: at(2024, 2, 10),
            },
        ];

        let summary = goal_summary(&goals, month_window("03-2024").unwrap(), date(2024, 3, 10));

        assert_eq!(summary.goals.len(), 1);
        assert_eq!(summary.expired, vec![2]);
        assert_eq!(summary.goals[0].days_left, 83);
        assert_eq!(summary.goals[0].percentage_reached, "25.00");
        assert_eq!(summary.total_goals_amount, 1000.0);
        assert_eq!(summary.percentage_saved, 25.0);
    }

    #[test]
    fn test_goal_due_today_is_active() {
        let goals = vec![Goal {
            id: 1,
            note: None,
            target_date: date(2024, 3, 10),
            goal_amount: 100.0,
            money_saved: 10.0,
            created_at: at(2024, 3, 1),
        }];
        let summary = goal_summary(&goals, month_window("03-2024").unwrap(), date(2024, 3, 10));
        assert_eq!(summary.goals[0].days_left, 0);
        assert!(summary.expired.is_empty());
    }

    #[test]
    fn test_investment_summary() {
        let mut gold = Investment::new(1, "Bank", "Gold", 1000.0);
        gold.created_at = at(2024, 3, 3);
        gold.current_value = 1100.0;
        let mut stocks = Investment::new(2, "Broker", "Stocks", 2000.0);
        stocks.created_at = at(2024, 3, 20);
        stocks.current_value = 1800.0;
        let mut old = Investment::new(3, "Broker", "Bonds", 500.0);
        old.created_at = at(2023, 3, 20);

        let summary = investment_summary(&[gold, stocks, old], month_window("03-2024").unwrap());

        assert_eq!(summary.investments.len(), 2);
        assert_eq!(summary.investments[0].profit_loss, 100.0);
        assert_eq!(summary.investments[0].percentage_reached, "110.00");
        assert_eq!(summary.investments[1].profit_loss, -200.0);
        assert_eq!(summary.total_invested_amount, 3000.0);
        assert_eq!(summary.total_current_value, 2900.0);
        assert_eq!(summary.total_profit_loss, -100.0);
    }

    #[test]
    fn test_loan_portfolio() {
        let engine = InstallmentEngine::default();
        let loans = vec![
            loan(1, "asha", "ravi", LoanDirection::Given),
            loan(2, "asha", "meera", LoanDirection::Got),
            loan(3, "ravi", "meera", LoanDirection::Got),
        ];

        let portfolio = loan_portfolio(&loans, "asha", &engine, at(2024, 3, 10));

        assert_eq!(portfolio.next_receivables.len(), 1);
        assert_eq!(portfolio.next_installments.len(), 1);
        assert_eq!(portfolio.next_receivables[0].counterparty, "ravi");
        assert_eq!(portfolio.next_installments[0].counterparty, "meera");
        assert!((portfolio.amount_to_receive - 1120.0).abs() < 1e-9);
        assert!((portfolio.amount_to_give - 1120.0).abs() < 1e-9);
        // First monthly boundary (2024-02-01) has passed
        assert_eq!(portfolio.overdue_receivables.len(), 1);
        assert_eq!(portfolio.overdue_installments.len(), 1);
        assert_eq!(
            portfolio.next_installments[0].next_installment_date,
            Some(date(2024, 4, 1))
        );
    }

    #[test]
    fn test_loan_portfolio_skips_invalid_terms() {
        let engine = InstallmentEngine::default();
        let mut broken = loan(1, "asha", "ravi", LoanDirection::Given);
        broken.terms.repayment_date = date(2023, 1, 1);

        let portfolio = loan_portfolio(&[broken], "asha", &engine, at(2024, 3, 10));
        assert!(portfolio.next_receivables.is_empty());
        assert_eq!(portfolio.amount_to_receive, 0.0);
    }

    #[test]
    fn test_net_worth() {
        let engine = InstallmentEngine::default();
        let mut holding = Investment::new(1, "Broker", "Stocks", 2000.0);
        holding.current_value = 2500.0;
        let loans = vec![loan(1, "asha", "meera", LoanDirection::Got)];

        let worth = net_worth(
            &[holding],
            &loans,
            &sample_transactions(),
            "asha",
            &engine,
            at(2024, 3, 10),
        );

        assert_eq!(worth.total_investments, 2500.0);
        assert!((worth.total_liabilities - 1120.0).abs() < 1e-9);
        assert!((worth.net_worth - 1380.0).abs() < 1e-9);
        assert_eq!(worth.transactions.net, 4480.0);
    }

    #[test]
    fn test_financial_summary_without_budget() {
        let engine = InstallmentEngine::default();
        let mut ledger = Ledger::new("asha");
        ledger.loans.push(loan(1, "asha", "ravi", LoanDirection::Given));
        ledger
            .add_goal(Some("Trip".into()), date(2024, 1, 1), 100.0, 50.0, at(2023, 12, 1))
            .unwrap();

        let summary = financial_summary(&ledger, &engine, at(2024, 3, 10));
        assert!(summary.budget.is_none());
        assert_eq!(summary.goals.len(), 1);
        assert!(summary.goals[0].days_left < 0);
        assert_eq!(summary.loans.next_receivables.len(), 1);
    }
}
