//! Installment engine
//!
//! Turns a loan's terms into a repayment plan and a point-in-time status:
//! - total payable under simple or compound interest
//! - number of installments and the amount of each
//! - whether the first installment is late
//! - calendar dates of individual installments
//!
//! Everything here is a pure function of its inputs plus "now". Nothing is
//! cached: overdue flags and installments left depend on the wall clock and
//! are recomputed on every call.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Frequency, InstallmentSchedule, InterestType, LoanAgreement, LoanTerms};

/// Default absolute tolerance for caller-supplied installment amounts
pub const DEFAULT_TOLERANCE: f64 = 100.0;

/// How the number of installments is derived from the loan span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingConvention {
    /// `round(years * periods_per_year)`, at least 1
    #[default]
    Periods,
    /// `floor(days / 7|30|365)`, at least 1.
    ///
    /// Deprecated: disagrees with `Periods` for spans that are not whole
    /// periods. Kept so older plans can be reproduced.
    ElapsedDays,
}

/// How the loan span is converted to years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearBasis {
    /// Whole calendar years between the dates, plus remaining days / 365
    #[default]
    Anniversary,
    /// Total days / 365, the plain `(repayment_date - date_given) / 365`
    /// span. Plans recorded under this basis come out slightly short for
    /// spans crossing a leap day.
    #[serde(rename = "actual_365")]
    Actual365,
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallmentConfig {
    /// Allowed absolute difference between expected and computed installment
    pub tolerance: f64,
    pub counting: CountingConvention,
    pub year_basis: YearBasis,
}

impl Default for InstallmentConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            counting: CountingConvention::default(),
            year_basis: YearBasis::default(),
        }
    }
}

/// Repayment plan computed from loan terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub total_payable: f64,
    pub installment_count: u32,
    pub installment_amount: f64,
    /// Span of the loan in years, as used by the interest formulas
    pub years: f64,
}

/// Point-in-time view of a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanStatus {
    pub loan_id: i64,
    pub plan: InstallmentPlan,
    pub installments_left: u32,
    pub amount_paid: f64,
    pub next_installment_date: Option<NaiveDate>,
    pub overdue: bool,
}

/// Stateless calculator for loan plans
#[derive(Debug, Clone, Default)]
pub struct InstallmentEngine {
    config: InstallmentConfig,
}

impl InstallmentEngine {
    pub fn new(config: InstallmentConfig) -> Self {
        if config.counting == CountingConvention::ElapsedDays {
            warn!("Using deprecated elapsed-days installment counting");
        }
        Self { config }
    }

    pub fn config(&self) -> &InstallmentConfig {
        &self.config
    }

    /// Loan span in years according to the configured year basis
    pub fn years_between(&self, from: NaiveDate, to: NaiveDate) -> f64 {
        let days = (to - from).num_days() as f64;
        match self.config.year_basis {
            YearBasis::Actual365 => days / 365.0,
            YearBasis::Anniversary => {
                let mut whole = (to.year() - from.year()).max(0);
                let anchor = loop {
                    match add_periods(from, Frequency::Yearly, whole as u32) {
                        Some(anchor) if anchor <= to => break anchor,
                        _ if whole > 0 => whole -= 1,
                        _ => break from,
                    }
                };
                whole as f64 + (to - anchor).num_days() as f64 / 365.0
            }
        }
    }

    /// Compute total payable, installment count and per-installment amount.
    ///
    /// Fails with `InvalidSchedule` when the repayment date is not after the
    /// date given, and with `InstallmentMismatch` when the terms carry an
    /// expected installment amount outside the configured tolerance.
    pub fn compute_plan(&self, terms: &LoanTerms) -> Result<InstallmentPlan> {
        if !terms.principal.is_finite() || terms.principal < 0.0 {
            return Err(Error::InvalidData(format!(
                "Principal must be a non-negative amount, got {}",
                terms.principal
            )));
        }
        if !terms.interest_rate.is_finite() || terms.interest_rate < 0.0 {
            return Err(Error::InvalidData(format!(
                "Interest rate must be non-negative, got {}",
                terms.interest_rate
            )));
        }
        if terms.repayment_date <= terms.date_given {
            return Err(Error::InvalidSchedule);
        }

        let years = self.years_between(terms.date_given, terms.repayment_date);
        let k = terms.frequency.periods_per_year() as f64;
        let principal = terms.principal;
        let rate = terms.interest_rate;

        let total_payable = match terms.interest_type {
            InterestType::Simple => principal + principal * rate / 100.0 * years,
            InterestType::Compound => principal * (1.0 + rate / (100.0 * k)).powf(k * years),
        };

        let installment_count = self.installment_count(terms, years);
        if installment_count == 0 {
            return Err(Error::DivisionByZero);
        }
        let installment_amount = total_payable / installment_count as f64;

        debug!(
            "Computed plan: total {:.2} over {} installments of {:.2} ({:.4} years)",
            total_payable, installment_count, installment_amount, years
        );

        if let Some(expected) = terms.installment_amount {
            if (expected - installment_amount).abs() > self.config.tolerance {
                return Err(Error::InstallmentMismatch {
                    provided: expected,
                    computed: installment_amount,
                });
            }
        }

        Ok(InstallmentPlan {
            total_payable,
            installment_count,
            installment_amount,
            years,
        })
    }

    /// Plan plus the overdue flag as of `now`
    pub fn schedule(&self, terms: &LoanTerms, now: DateTime<Utc>) -> Result<InstallmentSchedule> {
        let plan = self.compute_plan(terms)?;
        Ok(InstallmentSchedule {
            total_payable: plan.total_payable,
            installment_count: plan.installment_count,
            installment_amount: plan.installment_amount,
            overdue: is_overdue(terms.date_given, terms.frequency, now),
        })
    }

    /// Installments left, amount paid so far and the next due date
    pub fn loan_status(&self, loan: &LoanAgreement, now: DateTime<Utc>) -> Result<LoanStatus> {
        let terms = &loan.terms;
        // Stored installment amounts were validated when the loan was recorded
        let plan = self.compute_plan(&LoanTerms {
            installment_amount: None,
            ..terms.clone()
        })?;
        let today = now.date_naive();

        let days_left = (terms.repayment_date - today).num_days() as f64;
        let installments_left = (days_left / terms.frequency.approx_days() as f64)
            .ceil()
            .max(0.0) as u32;
        let per_installment = terms.installment_amount.unwrap_or(plan.installment_amount);
        let amount_paid =
            (plan.total_payable - per_installment * installments_left as f64).max(0.0);

        let next_installment_date = (1..=plan.installment_count)
            .filter_map(|i| add_periods(terms.date_given, terms.frequency, i))
            .find(|d| *d > today)
            .map(|d| d.min(terms.repayment_date))
            .or_else(|| (terms.repayment_date > today).then_some(terms.repayment_date));

        Ok(LoanStatus {
            loan_id: loan.id,
            plan,
            installments_left,
            amount_paid,
            next_installment_date,
            overdue: is_overdue(terms.date_given, terms.frequency, now),
        })
    }

    fn installment_count(&self, terms: &LoanTerms, years: f64) -> u32 {
        let count = match self.config.counting {
            CountingConvention::Periods => {
                (years * terms.frequency.periods_per_year() as f64).round() as u32
            }
            CountingConvention::ElapsedDays => {
                let days = (terms.repayment_date - terms.date_given).num_days();
                (days / terms.frequency.approx_days()) as u32
            }
        };
        count.max(1)
    }
}

/// Whether the first installment period has passed.
///
/// Only the first boundary (`date_given` plus one period) is checked, not the
/// most recent one.
pub fn is_overdue(date_given: NaiveDate, frequency: Frequency, now: DateTime<Utc>) -> bool {
    match add_periods(date_given, frequency, 1) {
        Some(boundary) => now > boundary.and_time(NaiveTime::MIN).and_utc(),
        None => false,
    }
}

/// Date of installment number `index`, counted in whole periods from `date_given`
pub fn next_installment_date(
    date_given: NaiveDate,
    frequency: Frequency,
    index: u32,
) -> Result<NaiveDate> {
    add_periods(date_given, frequency, index).ok_or_else(|| {
        Error::InvalidData(format!(
            "Installment {} from {} is out of the supported date range",
            index, date_given
        ))
    })
}

/// Calendar arithmetic: months and years clamp to the end of shorter months
fn add_periods(date: NaiveDate, frequency: Frequency, count: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Weekly => date.checked_add_days(Days::new(7 * count as u64)),
        Frequency::Monthly => date.checked_add_months(Months::new(count)),
        Frequency::Yearly => date.checked_add_months(Months::new(count.checked_mul(12)?)),
    }
}
