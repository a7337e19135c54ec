//! Domain models for Jodloo

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::collaborators::Collaborators;
use crate::error::Error;

/// Installment (and compounding) frequency of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Monthly => 12,
            Self::Yearly => 1,
        }
    }

    /// Approximate period length in days, used for "installments left" style counts
    pub fn approx_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" => Ok(Self::Yearly),
            _ => Err(format!("Unknown installment frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How interest accrues on a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestType {
    Simple,
    Compound,
}

impl InterestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Compound => "compound",
        }
    }
}

impl std::str::FromStr for InterestType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "compound" => Ok(Self::Compound),
            _ => Err(Error::InvalidInterestType(s.to_string())),
        }
    }
}

impl std::fmt::Display for InterestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a loan from the recording user's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanDirection {
    /// The user borrowed the money
    Got,
    /// The user lent the money
    Given,
}

impl LoanDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Got => "got",
            Self::Given => "given",
        }
    }
}

impl std::str::FromStr for LoanDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "got" | "borrowed" => Ok(Self::Got),
            "given" | "lent" => Ok(Self::Given),
            _ => Err(format!("Unknown loan direction: {}", s)),
        }
    }
}

impl std::fmt::Display for LoanDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The financial terms of a loan, everything the installment engine needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,
    /// Percent per year
    pub interest_rate: f64,
    pub interest_type: InterestType,
    pub date_given: NaiveDate,
    pub repayment_date: NaiveDate,
    pub frequency: Frequency,
    /// Installment amount the caller expects; validated against the computed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_amount: Option<f64>,
}

/// A peer-to-peer loan ("udhaar") between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAgreement {
    pub id: i64,
    pub lender: String,
    pub borrower: String,
    pub direction: LoanDirection,
    #[serde(flatten)]
    pub terms: LoanTerms,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LoanAgreement {
    /// Build a loan recorded by `user` against `counterparty`.
    ///
    /// `Given` makes the user the lender, `Got` makes them the borrower.
    pub fn record(
        id: i64,
        user: &str,
        counterparty: &str,
        direction: LoanDirection,
        terms: LoanTerms,
        purpose: impl Into<String>,
    ) -> Self {
        let (lender, borrower) = match direction {
            LoanDirection::Given => (user.to_string(), counterparty.to_string()),
            LoanDirection::Got => (counterparty.to_string(), user.to_string()),
        };
        Self {
            id,
            lender,
            borrower,
            direction,
            terms,
            purpose: purpose.into(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Whether `user` is a party to this loan
    pub fn involves(&self, user: &str) -> bool {
        self.lender == user || self.borrower == user
    }
}

/// Partial update of a loan's mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanUpdate {
    pub principal: Option<f64>,
    pub interest_rate: Option<f64>,
    pub interest_type: Option<InterestType>,
    pub date_given: Option<NaiveDate>,
    pub repayment_date: Option<NaiveDate>,
    pub frequency: Option<Frequency>,
    pub installment_amount: Option<f64>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
}

impl LoanUpdate {
    pub fn apply(&self, loan: &mut LoanAgreement) {
        let terms = &mut loan.terms;
        if let Some(v) = self.principal {
            terms.principal = v;
        }
        if let Some(v) = self.interest_rate {
            terms.interest_rate = v;
        }
        if let Some(v) = self.interest_type {
            terms.interest_type = v;
        }
        if let Some(v) = self.date_given {
            terms.date_given = v;
        }
        if let Some(v) = self.repayment_date {
            terms.repayment_date = v;
        }
        if let Some(v) = self.frequency {
            terms.frequency = v;
        }
        if let Some(v) = self.installment_amount {
            terms.installment_amount = Some(v);
        }
        if let Some(ref v) = self.purpose {
            loan.purpose = v.clone();
        }
        if let Some(ref v) = self.notes {
            loan.notes = Some(v.clone());
        }
    }
}

/// Derived repayment plan for a loan. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub total_payable: f64,
    pub installment_count: u32,
    pub installment_amount: f64,
    pub overdue: bool,
}

/// Income or expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dated, categorized income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub account: String,
    pub category: String,
    /// Always positive; `kind` carries the sign
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// SHA-256 of the source row, set for imported transactions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_hash: Option<String>,
    /// Budget whose category usage this expense was charged to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charged_budget: Option<i64>,
}

/// A transaction that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionType,
    pub account: String,
    pub category: String,
    pub amount: f64,
    pub note: Option<String>,
    pub import_hash: Option<String>,
}

impl NewTransaction {
    pub fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            date: self.date,
            kind: self.kind,
            account: self.account,
            category: self.category,
            amount: self.amount,
            note: self.note,
            import_hash: self.import_hash,
            charged_budget: None,
        }
    }
}

/// A named spending bucket with an allocated cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    #[serde(alias = "category")]
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub used_amount: f64,
}

impl BudgetCategory {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
            used_amount: 0.0,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.amount - self.used_amount
    }
}

/// When a budget's usage window starts over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPeriod {
    EveryDay,
    Weekdays,
    Weekend,
    EveryWeek,
    EveryMonth,
    EveryYear,
}

impl ResetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EveryDay => "Every Day",
            Self::Weekdays => "Weekdays",
            Self::Weekend => "Weekend",
            Self::EveryWeek => "Every Week",
            Self::EveryMonth => "Every Month",
            Self::EveryYear => "Every Year",
        }
    }

    pub fn all() -> &'static [ResetPeriod] {
        &[
            Self::EveryDay,
            Self::Weekdays,
            Self::Weekend,
            Self::EveryWeek,
            Self::EveryMonth,
            Self::EveryYear,
        ]
    }
}

impl std::str::FromStr for ResetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Self::all()
            .iter()
            .copied()
            .find(|p| p.as_str().to_lowercase() == normalized)
            .ok_or_else(|| {
                let valid: Vec<_> = Self::all().iter().map(|p| p.as_str()).collect();
                format!(
                    "Invalid reset period. Valid options are: {}",
                    valid.join(", ")
                )
            })
    }
}

impl std::fmt::Display for ResetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// When to alert the user about budget consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertThreshold {
    None,
    #[serde(rename = "every_10")]
    Every10,
    #[serde(rename = "every_20")]
    Every20,
    #[serde(rename = "every_30")]
    Every30,
    #[serde(rename = "every_50")]
    Every50,
    #[serde(rename = "remaining_20")]
    Remaining20,
    #[serde(rename = "remaining_30")]
    Remaining30,
}

impl AlertThreshold {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Every10 => "Every 10%",
            Self::Every20 => "Every 20%",
            Self::Every30 => "Every 30%",
            Self::Every50 => "Every 50%",
            Self::Remaining20 => "Remaining 20%",
            Self::Remaining30 => "Remaining 30%",
        }
    }

    pub fn all() -> &'static [AlertThreshold] {
        &[
            Self::None,
            Self::Every10,
            Self::Every20,
            Self::Every30,
            Self::Every50,
            Self::Remaining20,
            Self::Remaining30,
        ]
    }
}

impl std::str::FromStr for AlertThreshold {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', " ");
        Self::all()
            .iter()
            .copied()
            .find(|t| {
                let name = t.as_str().to_lowercase();
                name == normalized || name.trim_end_matches('%') == normalized
            })
            .ok_or_else(|| {
                let valid: Vec<_> = Self::all().iter().map(|t| t.as_str()).collect();
                format!(
                    "Invalid alert threshold. Valid options are: {}",
                    valid.join(", ")
                )
            })
    }
}

impl std::fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget shared between collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub reset_period: ResetPeriod,
    pub alert_threshold: AlertThreshold,
    pub categories: Vec<BudgetCategory>,
    pub collaborators: Collaborators,
}

impl Budget {
    pub fn category(&self, name: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut BudgetCategory> {
        self.categories.iter_mut().find(|c| c.name == name)
    }

    pub fn total_amount(&self) -> f64 {
        self.categories.iter().map(|c| c.amount).sum()
    }
}

/// A savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    /// Used as the goal's display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub target_date: NaiveDate,
    pub goal_amount: f64,
    pub money_saved: f64,
    pub created_at: DateTime<Utc>,
}

/// An investment holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    pub account: String,
    pub category: String,
    pub invested_amount: f64,
    pub current_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Investment {
    /// A fresh holding is valued at what was put in
    pub fn new(
        id: i64,
        account: impl Into<String>,
        category: impl Into<String>,
        invested_amount: f64,
    ) -> Self {
        Self {
            id,
            account: account.into(),
            category: category.into(),
            invested_amount,
            current_value: invested_amount,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn profit_loss(&self) -> f64 {
        self.current_value - self.invested_amount
    }
}

/// Half-open date range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The calendar month containing `date`
    pub fn month_of(date: NaiveDate) -> Self {
        let start = date - Days::new(date.day0() as u64);
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// The calendar year containing `date`
    pub fn year_of(date: NaiveDate) -> Self {
        let start = date - Days::new(date.ordinal0() as u64);
        let end = start
            .checked_add_months(Months::new(12))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interest_type_parse() {
        assert_eq!(
            "Simple".parse::<InterestType>().unwrap(),
            InterestType::Simple
        );
        let err = "flat".parse::<InterestType>().unwrap_err();
        assert!(matches!(err, Error::InvalidInterestType(ref s) if s == "flat"));
    }

    #[test]
    fn test_reset_period_parse_display_names() {
        assert_eq!(
            "Every Month".parse::<ResetPeriod>().unwrap(),
            ResetPeriod::EveryMonth
        );
        assert_eq!(
            "every_week".parse::<ResetPeriod>().unwrap(),
            ResetPeriod::EveryWeek
        );
        assert!("Fortnightly".parse::<ResetPeriod>().is_err());
    }

    #[test]
    fn test_alert_threshold_parse() {
        assert_eq!(
            "Every 10%".parse::<AlertThreshold>().unwrap(),
            AlertThreshold::Every10
        );
        assert_eq!(
            "remaining 30".parse::<AlertThreshold>().unwrap(),
            AlertThreshold::Remaining30
        );
        let err = "Every 15%".parse::<AlertThreshold>().unwrap_err();
        assert!(err.contains("Valid options are"));
    }

    #[test]
    fn test_loan_record_sets_parties() {
        let terms = LoanTerms {
            principal: 500.0,
            interest_rate: 5.0,
            interest_type: InterestType::Simple,
            date_given: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            repayment_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            frequency: Frequency::Monthly,
            installment_amount: None,
        };

        let lent = LoanAgreement::record(1, "asha", "ravi", LoanDirection::Given, terms.clone(), "rent");
        assert_eq!(lent.lender, "asha");
        assert_eq!(lent.borrower, "ravi");

        let borrowed = LoanAgreement::record(2, "asha", "ravi", LoanDirection::Got, terms, "rent");
        assert_eq!(borrowed.lender, "ravi");
        assert_eq!(borrowed.borrower, "asha");
        assert!(borrowed.involves("asha"));
        assert!(!borrowed.involves("meera"));
    }

    #[test]
    fn test_loan_update_partial() {
        let terms = LoanTerms {
            principal: 500.0,
            interest_rate: 5.0,
            interest_type: InterestType::Simple,
            date_given: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            repayment_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            frequency: Frequency::Monthly,
            installment_amount: None,
        };
        let mut loan = LoanAgreement::record(1, "asha", "ravi", LoanDirection::Given, terms, "rent");

        let update = LoanUpdate {
            interest_rate: Some(8.0),
            frequency: Some(Frequency::Weekly),
            ..Default::default()
        };
        update.apply(&mut loan);

        assert_eq!(loan.terms.interest_rate, 8.0);
        assert_eq!(loan.terms.frequency, Frequency::Weekly);
        assert_eq!(loan.terms.principal, 500.0);
        assert_eq!(loan.purpose, "rent");
    }

    #[test]
    fn test_date_window_half_open() {
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        );
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_month_and_year_windows() {
        let month = DateWindow::month_of(NaiveDate::from_ymd_opt(2024, 12, 17).unwrap());
        assert_eq!(month.start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
        assert_eq!(month.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let year = DateWindow::year_of(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(year.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(year.end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
