//! Ledger documents
//!
//! A ledger is one user's data (budgets, transactions, loans, goals and
//! investments) stored as a single JSON file. Mutations keep the stored
//! budget usage in step with the transactions recorded against it.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::budget::BudgetAlert;
use crate::collaborators::{AccessLevel, Collaborators};
use crate::error::{Error, Result};
use crate::installments::InstallmentEngine;
use crate::models::{
    AlertThreshold, Budget, BudgetCategory, Goal, Investment, LoanAgreement, LoanUpdate,
    NewTransaction, ResetPeriod, Transaction, TransactionType,
};
use crate::subscription::UserSubscription;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub user: String,
    #[serde(default)]
    pub subscription: UserSubscription,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_budget: Option<i64>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub loans: Vec<LoanAgreement>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub investments: Vec<Investment>,
}

/// Result of recording a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub id: i64,
    /// Alert raised by the active budget, if the spend crossed its threshold
    pub alert: Option<BudgetAlert>,
}

/// Counts from merging an import into the ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub imported: usize,
    pub skipped: usize,
}

/// Where an expense was charged, and the alert it raised
#[derive(Debug, Default)]
struct Charge {
    budget: Option<i64>,
    alert: Option<BudgetAlert>,
}

fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

fn check_amount(what: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidData(format!(
            "{} must be a positive amount, got {}",
            what, amount
        )));
    }
    Ok(())
}

impl Ledger {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            subscription: UserSubscription::default(),
            budgets: Vec::new(),
            active_budget: None,
            transactions: Vec::new(),
            loans: Vec::new(),
            goals: Vec::new(),
            investments: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let ledger: Self = serde_json::from_str(&content)?;
        debug!(
            "Loaded ledger for {} ({} transactions, {} loans) from {}",
            ledger.user,
            ledger.transactions.len(),
            ledger.loans.len(),
            path.display()
        );
        Ok(ledger)
    }

    /// Write the ledger atomically: a temp file in the same directory is
    /// persisted over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        debug!("Saved ledger to {}", path.display());
        Ok(())
    }

    // --- Budgets ---

    /// Create a budget owned by the ledger user. The first budget becomes active.
    pub fn create_budget(
        &mut self,
        name: &str,
        reset_period: ResetPeriod,
        alert_threshold: AlertThreshold,
        categories: Vec<BudgetCategory>,
        invited: &[(&str, Option<AccessLevel>)],
    ) -> Result<i64> {
        if name.trim().is_empty() {
            return Err(Error::InvalidData("Budget name is required".into()));
        }
        if categories.is_empty() {
            return Err(Error::InvalidData(
                "A budget needs at least one category".into(),
            ));
        }
        let mut names = HashSet::new();
        for c in &categories {
            if !c.amount.is_finite() || c.amount < 0.0 {
                return Err(Error::InvalidData(format!(
                    "Category {} has an invalid amount: {}",
                    c.name, c.amount
                )));
            }
            if !names.insert(c.name.as_str()) {
                return Err(Error::InvalidData(format!(
                    "Category {} is listed more than once",
                    c.name
                )));
            }
        }

        let collaborators = Collaborators::new(&self.user, invited)?;
        let id = next_id(self.budgets.iter().map(|b| b.id));
        self.budgets.push(Budget {
            id,
            name: name.trim().to_string(),
            reset_period,
            alert_threshold,
            categories,
            collaborators,
        });
        if self.active_budget.is_none() {
            self.active_budget = Some(id);
        }
        info!("Created budget {} ({})", id, name.trim());
        Ok(id)
    }

    pub fn budget(&self, id: i64) -> Option<&Budget> {
        self.budgets.iter().find(|b| b.id == id)
    }

    /// Budgets the ledger user can see
    pub fn visible_budgets(&self) -> impl Iterator<Item = &Budget> {
        self.budgets
            .iter()
            .filter(|b| b.collaborators.can_view(&self.user))
    }

    pub fn active_budget(&self) -> Option<&Budget> {
        self.active_budget.and_then(|id| self.budget(id))
    }

    pub fn active_budget_mut(&mut self) -> Option<&mut Budget> {
        let id = self.active_budget?;
        self.budgets.iter_mut().find(|b| b.id == id)
    }

    pub fn activate_budget(&mut self, id: i64) -> Result<()> {
        let budget = self
            .budget(id)
            .ok_or_else(|| Error::NotFound(format!("Budget {}", id)))?;
        if !budget.collaborators.can_view(&self.user) {
            return Err(Error::Collaborator(format!(
                "{} is not a collaborator on budget {}",
                self.user, id
            )));
        }
        self.active_budget = Some(id);
        info!("Activated budget {}", id);
        Ok(())
    }

    // --- Transactions ---

    /// Record a transaction. Expenses are checked against and charged to the
    /// active budget, when there is one.
    pub fn add_transaction(&mut self, tx: NewTransaction) -> Result<Recorded> {
        check_amount("Transaction amount", tx.amount)?;
        if tx.category.trim().is_empty() {
            return Err(Error::InvalidData("Transaction category is required".into()));
        }

        let charge = if tx.kind == TransactionType::Expense {
            self.charge_active_budget(&tx.category, tx.amount)?
        } else {
            Charge::default()
        };

        let id = next_id(self.transactions.iter().map(|t| t.id));
        let mut recorded = tx.with_id(id);
        recorded.charged_budget = charge.budget;
        self.transactions.push(recorded);
        debug!("Recorded transaction {}", id);
        Ok(Recorded {
            id,
            alert: charge.alert,
        })
    }

    /// Replace a transaction, moving its budget charge to the new values
    pub fn update_transaction(&mut self, id: i64, tx: NewTransaction) -> Result<Recorded> {
        check_amount("Transaction amount", tx.amount)?;
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;

        let old = self.transactions[index].clone();
        let refunded = self.refund(&old);

        let charge = if tx.kind == TransactionType::Expense {
            match self.charge_active_budget(&tx.category, tx.amount) {
                Ok(charge) => charge,
                Err(e) => {
                    // Put back exactly what the refund took out
                    if let (Some(budget), Some(used)) = (old.charged_budget, refunded) {
                        if let Some(cat) = self.budget_category_mut(budget, &old.category) {
                            cat.used_amount = used;
                        }
                    }
                    return Err(e);
                }
            }
        } else {
            Charge::default()
        };

        let mut updated = tx.with_id(id);
        updated.charged_budget = charge.budget;
        self.transactions[index] = updated;
        Ok(Recorded {
            id,
            alert: charge.alert,
        })
    }

    /// Delete a transaction, returning an expense's amount to the budget it
    /// was charged to
    pub fn remove_transaction(&mut self, id: i64) -> Result<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))?;
        let removed = self.transactions.remove(index);
        self.refund(&removed);
        Ok(removed)
    }

    /// Append imported transactions, skipping any whose import hash is
    /// already in the ledger. Imported rows do not touch stored budget usage.
    pub fn merge_imported(&mut self, imported: Vec<NewTransaction>) -> MergeStats {
        let mut known: HashSet<String> = self
            .transactions
            .iter()
            .filter_map(|t| t.import_hash.clone())
            .collect();
        let mut stats = MergeStats::default();
        let mut id = next_id(self.transactions.iter().map(|t| t.id));

        for tx in imported {
            if let Some(hash) = &tx.import_hash {
                if !known.insert(hash.clone()) {
                    stats.skipped += 1;
                    continue;
                }
            }
            self.transactions.push(tx.with_id(id));
            id += 1;
            stats.imported += 1;
        }

        info!(
            "Imported {} transactions ({} already present)",
            stats.imported, stats.skipped
        );
        stats
    }

    fn charge_active_budget(&mut self, category: &str, amount: f64) -> Result<Charge> {
        let user = self.user.clone();
        let Some(budget) = self.active_budget_mut() else {
            return Ok(Charge::default());
        };
        if !budget.collaborators.can_edit(&user) {
            return Err(Error::Collaborator(format!(
                "{} cannot spend from budget {}",
                user, budget.name
            )));
        }

        let before: f64 = budget.categories.iter().map(|c| c.used_amount).sum();
        budget.spend(category, amount)?;
        let after = before + amount;
        let alert = budget
            .alert_threshold
            .crossed(budget.total_amount(), before, after);
        if let Some(a) = &alert {
            info!("Budget {}: {}", budget.name, a.message);
        }
        Ok(Charge {
            budget: Some(budget.id),
            alert,
        })
    }

    /// Revert the charge a transaction made, if it made one. Returns the
    /// category's usage from before the refund.
    fn refund(&mut self, tx: &Transaction) -> Option<f64> {
        let budget = tx.charged_budget?;
        let cat = self.budget_category_mut(budget, &tx.category)?;
        let used = cat.used_amount;
        cat.revert_spend(tx.amount);
        Some(used)
    }

    fn budget_category_mut(&mut self, budget: i64, category: &str) -> Option<&mut BudgetCategory> {
        self.budgets
            .iter_mut()
            .find(|b| b.id == budget)
            .and_then(|b| b.category_mut(category))
    }

    // --- Loans ---

    /// Record a loan after validating its terms with the engine
    pub fn add_loan(&mut self, mut loan: LoanAgreement, engine: &InstallmentEngine) -> Result<i64> {
        if !loan.involves(&self.user) {
            return Err(Error::InvalidData(format!(
                "{} is not a party to this loan",
                self.user
            )));
        }
        if loan.lender == loan.borrower {
            return Err(Error::InvalidData(
                "Lender and borrower must be different users".into(),
            ));
        }
        engine.compute_plan(&loan.terms)?;

        loan.id = next_id(self.loans.iter().map(|l| l.id));
        let id = loan.id;
        self.loans.push(loan);
        info!("Recorded loan {}", id);
        Ok(id)
    }

    /// Apply a partial update; the loan is left untouched if the new terms
    /// do not validate
    pub fn update_loan(
        &mut self,
        id: i64,
        update: &LoanUpdate,
        engine: &InstallmentEngine,
    ) -> Result<&LoanAgreement> {
        let loan = self
            .loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("Loan {}", id)))?;
        let mut updated = loan.clone();
        update.apply(&mut updated);
        engine.compute_plan(&updated.terms)?;
        *loan = updated;
        Ok(&*loan)
    }

    pub fn remove_loan(&mut self, id: i64) -> Result<LoanAgreement> {
        let index = self
            .loans
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| Error::NotFound(format!("Loan {}", id)))?;
        Ok(self.loans.remove(index))
    }

    // --- Goals ---

    pub fn add_goal(
        &mut self,
        note: Option<String>,
        target_date: NaiveDate,
        goal_amount: f64,
        money_saved: f64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        check_amount("Goal amount", goal_amount)?;
        if !money_saved.is_finite() || money_saved < 0.0 {
            return Err(Error::InvalidData(format!(
                "Money saved must be non-negative, got {}",
                money_saved
            )));
        }
        let id = next_id(self.goals.iter().map(|g| g.id));
        self.goals.push(Goal {
            id,
            note,
            target_date,
            goal_amount,
            money_saved,
            created_at: now,
        });
        Ok(id)
    }

    /// Add to the money saved towards a goal
    pub fn save_towards_goal(&mut self, id: i64, amount: f64) -> Result<&Goal> {
        check_amount("Saved amount", amount)?;
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;
        goal.money_saved += amount;
        Ok(&*goal)
    }

    pub fn remove_goal(&mut self, id: i64) -> Result<Goal> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))?;
        Ok(self.goals.remove(index))
    }

    // --- Investments ---

    pub fn add_investment(
        &mut self,
        account: &str,
        category: &str,
        invested_amount: f64,
        note: Option<String>,
    ) -> Result<i64> {
        check_amount("Invested amount", invested_amount)?;
        let id = next_id(self.investments.iter().map(|i| i.id));
        let mut investment = Investment::new(id, account, category, invested_amount);
        investment.note = note;
        self.investments.push(investment);
        Ok(id)
    }

    /// Record the current market value of a holding
    pub fn revalue_investment(&mut self, id: i64, current_value: f64) -> Result<&Investment> {
        if !current_value.is_finite() || current_value < 0.0 {
            return Err(Error::InvalidData(format!(
                "Current value must be non-negative, got {}",
                current_value
            )));
        }
        let investment = self
            .investments
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Investment {}", id)))?;
        investment.current_value = current_value;
        Ok(&*investment)
    }

    pub fn remove_investment(&mut self, id: i64) -> Result<Investment> {
        let index = self
            .investments
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| Error::NotFound(format!("Investment {}", id)))?;
        Ok(self.investments.remove(index))
    }
}
