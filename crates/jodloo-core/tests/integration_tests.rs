//! Integration tests for jodloo-core
//!
//! These tests exercise the full import → ledger → aggregate → report workflow
//! and the loan lifecycle through the installment engine.

use chrono::{NaiveDate, TimeZone, Utc};
use jodloo_core::{
    aggregate,
    import::parse_csv,
    installments::{is_overdue, next_installment_date},
    models::{
        AlertThreshold, BudgetCategory, Frequency, InterestType, LoanAgreement, LoanDirection,
        LoanTerms, NewTransaction, ResetPeriod, TransactionType,
    },
    reports, Config, Error, InstallmentEngine, Ledger,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// March 2024 statement: salary, groceries, a duplicated tea purchase and one
/// row from the following month
fn march_statement() -> &'static str {
    "Date,Type,Account,Category,Amount,Note
2024-03-01,income,Bank,Salary,\"50,000\",March salary
2024-03-02,expense,Card,Groceries,-1200,Weekly groceries
2024-03-05,expense,Cash,Food,40,Tea and snacks
2024-03-05,expense,Cash,Food,40,Tea and snacks
2024-03-18,expense,UPI,Transport,350,Cab to airport
2024-04-02,expense,Card,Groceries,900,Weekly groceries"
}

fn loan_terms() -> LoanTerms {
    LoanTerms {
        principal: 1000.0,
        interest_rate: 12.0,
        interest_type: InterestType::Simple,
        date_given: date(2024, 1, 1),
        repayment_date: date(2025, 1, 1),
        frequency: Frequency::Monthly,
        installment_amount: None,
    }
}

// =============================================================================
// Import → Ledger → Aggregate
// =============================================================================

#[test]
fn test_import_and_aggregate_workflow() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");

    let mut ledger = Ledger::new("asha");
    ledger
        .create_budget(
            "Household",
            ResetPeriod::EveryMonth,
            AlertThreshold::Every20,
            vec![
                BudgetCategory::new("Groceries", 5000.0),
                BudgetCategory::new("Food", 100.0),
                BudgetCategory::new("Transport", 0.0),
            ],
            &[],
        )
        .unwrap();

    let imported = parse_csv(march_statement().as_bytes()).expect("Failed to parse CSV");
    assert_eq!(imported.len(), 6);

    let stats = ledger.merge_imported(imported);
    assert_eq!(stats.imported, 6);
    ledger.save(&path).unwrap();

    // Re-importing the same statement adds nothing
    let mut reloaded = Ledger::load(&path).unwrap();
    let again = reloaded.merge_imported(parse_csv(march_statement().as_bytes()).unwrap());
    assert_eq!(again.imported, 0);
    assert_eq!(again.skipped, 6);
    assert_eq!(reloaded.transactions.len(), 6);

    let budget = reloaded.active_budget().unwrap();
    let window = reports::month_window("03-2024").unwrap();
    let usage = aggregate(&budget.categories, &reloaded.transactions, window);

    let groceries = &usage.categories[0];
    assert_eq!(groceries.used_amount, 1200.0);
    assert_eq!(groceries.used_percentage, "24.00");

    let food = &usage.categories[1];
    assert_eq!(food.used_amount, 80.0);
    assert_eq!(food.used_percentage, "80.00");

    // Zero cap reports zero rather than failing
    let transport = &usage.categories[2];
    assert_eq!(transport.used_amount, 350.0);
    assert_eq!(transport.used_percentage, "0.00");

    assert_eq!(usage.total_budget, 5100.0);
    assert_eq!(usage.total_used, 1630.0);
    assert_eq!(usage.total_income, 50000.0);
    assert_eq!(usage.total_expense, 1630.0);
    assert_eq!(usage.net_total, 48370.0);
}

#[test]
fn test_aggregate_spec_example_and_idempotence() {
    let categories = vec![BudgetCategory::new("Food", 100.0)];
    let mut ledger = Ledger::new("asha");
    ledger
        .add_transaction(NewTransaction {
            date: date(2024, 3, 5),
            kind: TransactionType::Expense,
            account: "Cash".into(),
            category: "Food".into(),
            amount: 40.0,
            note: None,
            import_hash: None,
        })
        .unwrap();

    let window = reports::month_window("03-2024").unwrap();
    let first = aggregate(&categories, &ledger.transactions, window);
    let second = aggregate(&categories, &ledger.transactions, window);

    assert_eq!(first.categories[0].used_amount, 40.0);
    assert_eq!(first.categories[0].used_percentage, "40.00");
    assert_eq!(first, second);

    let empty = aggregate(&categories, &[], window);
    assert_eq!(empty.total_used, 0.0);
    assert_eq!(empty.categories[0].used_percentage, "0.00");
}

#[test]
fn test_transaction_reports_after_import() {
    let mut ledger = Ledger::new("asha");
    ledger.merge_imported(parse_csv(march_statement().as_bytes()).unwrap());

    let by_day = reports::group_by_day(&ledger.transactions, reports::month_window("03-2024").unwrap());
    assert_eq!(by_day.days.len(), 4);
    assert_eq!(by_day.total, 50000.0 - 1630.0);

    let notes = reports::note_suggestions(&ledger.transactions, "weekly").unwrap();
    assert_eq!(notes, vec!["Weekly groceries"]);

    let overview = reports::expense_overview(&ledger.transactions);
    assert_eq!(overview.total_expense, 2530.0);
    assert_eq!(overview.categories[1].category, "Groceries");
    assert_eq!(overview.categories[1].amount, 2100.0);
}

// =============================================================================
// Installment Engine
// =============================================================================

#[test]
fn test_simple_interest_one_year() {
    let engine = InstallmentEngine::default();
    let plan = engine.compute_plan(&loan_terms()).unwrap();

    assert!((plan.total_payable - 1120.0).abs() < 1e-9);
    assert_eq!(plan.installment_count, 12);
    assert!((plan.installment_amount - 1120.0 / 12.0).abs() < 1e-9);
}

#[test]
fn test_compound_zero_rate_returns_principal() {
    let engine = InstallmentEngine::default();
    for frequency in [Frequency::Weekly, Frequency::Monthly, Frequency::Yearly] {
        let terms = LoanTerms {
            interest_rate: 0.0,
            interest_type: InterestType::Compound,
            frequency,
            ..loan_terms()
        };
        let plan = engine.compute_plan(&terms).unwrap();
        assert!((plan.total_payable - 1000.0).abs() < 1e-9);
    }
}

#[test]
fn test_invalid_schedule() {
    let engine = InstallmentEngine::default();
    let same_day = LoanTerms {
        repayment_date: date(2024, 1, 1),
        ..loan_terms()
    };
    assert!(matches!(
        engine.compute_plan(&same_day),
        Err(Error::InvalidSchedule)
    ));
}

#[test]
fn test_interest_type_parse_boundary() {
    let err = "floating".parse::<InterestType>().unwrap_err();
    assert!(matches!(err, Error::InvalidInterestType(_)));
}

#[test]
fn test_overdue_and_next_installment() {
    let given = date(2024, 1, 15);
    let just_after = Utc.with_ymd_and_hms(2024, 1, 15, 1, 0, 0).unwrap();
    let much_later = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

    for frequency in [Frequency::Weekly, Frequency::Monthly, Frequency::Yearly] {
        assert!(!is_overdue(given, frequency, just_after));
        assert!(is_overdue(given, frequency, much_later));
    }

    assert_eq!(
        next_installment_date(given, Frequency::Monthly, 2).unwrap(),
        date(2024, 3, 15)
    );
}

#[test]
fn test_loan_lifecycle_through_ledger() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.json");
    let config = Config::default();
    let engine = config.engine();

    let mut ledger = Ledger::new("asha");
    let mut terms = loan_terms();
    terms.installment_amount = Some(93.0);
    let lent = LoanAgreement::record(0, "asha", "ravi", LoanDirection::Given, terms, "Laptop");
    ledger.add_loan(lent, &engine).unwrap();

    let borrowed = LoanAgreement::record(0, "asha", "meera", LoanDirection::Got, loan_terms(), "Rent");
    ledger.add_loan(borrowed, &engine).unwrap();
    ledger.save(&path).unwrap();

    let ledger = Ledger::load(&path).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
    let portfolio = reports::loan_portfolio(&ledger.loans, "asha", &engine, now);

    assert_eq!(portfolio.next_receivables.len(), 1);
    assert_eq!(portfolio.next_installments.len(), 1);
    let receivable = &portfolio.next_receivables[0];
    assert_eq!(receivable.counterparty, "ravi");
    assert_eq!(receivable.installment_amount, 93.0);
    assert_eq!(receivable.next_installment_date, Some(date(2024, 4, 1)));

    let summary = reports::financial_summary(&ledger, &engine, now);
    assert!(summary.budget.is_none());
    assert_eq!(summary.loans, portfolio);
}

// =============================================================================
// Subscription gating
// =============================================================================

#[test]
fn test_subscribe_then_gate() {
    let config = Config::default();
    let plan = config.plan("6_months").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();

    let mut ledger = Ledger::new("asha");
    assert!(matches!(
        ledger.subscription.require_active(now),
        Err(Error::SubscriptionRequired)
    ));

    let till = ledger.subscription.extend(plan, now).unwrap();
    assert_eq!(till, Utc.with_ymd_and_hms(2024, 7, 31, 0, 0, 0).unwrap());
    assert!(ledger.subscription.require_active(now).is_ok());
    assert_eq!(plan.total_price(), 528.0);
}
