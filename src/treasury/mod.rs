//! Treasury: the finance ledger.
//!
//! Transactions, categories, cash/bank balances, the gold vault, monthly
//! budgets and savings goals. All mutators follow the same discipline:
//! validate, mutate the live document, save.
//!
//! # Dangling categories
//!
//! Transactions and budgets reference categories by id. Categories in use by
//! a transaction cannot be deleted through [`CodexDB::delete_category`], but
//! older documents may still hold dangling references; readers resolve them
//! to the "Other" label instead of failing.

pub mod types;

pub use types::{
    default_categories, Budget, BudgetStatus, Category, CategorySpend, GoldEntry, GoldHoldings,
    GoldQuote, MonthSummary, NewGoldEntry, NewTransaction, Reconciliation, SavingsGoal,
    Transaction, TransactionKind, Treasury, GRAMS_PER_TROY_OUNCE,
};

use tracing::{debug, instrument};

use crate::db::{CodexDB, Commit};
use crate::error::{NotFoundError, Result, ValidationError};
use crate::types::{month_key, RecordId, Timestamp};
use crate::validation::{
    finite_amount, non_negative_amount, optional_date, optional_label, positive_amount,
    required_date, required_label,
};

/// Label shown for a transaction whose category no longer exists.
pub const FALLBACK_CATEGORY_LABEL: &str = "Other";

/// Default color for categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#7f8c8d";

impl CodexDB {
    // =========================================================================
    // Transactions
    // =========================================================================

    /// Records an income or expense.
    ///
    /// The category is not required to exist.
    ///
    /// # Errors
    ///
    /// - `amount` is not a positive finite number
    /// - `date` is not `YYYY-MM-DD`
    /// - `note` is longer than the label limit
    #[instrument(skip(self, tx), fields(amount = tx.amount, kind = ?tx.kind))]
    pub fn add_transaction(&mut self, tx: NewTransaction) -> Result<Commit<RecordId>> {
        let amount = positive_amount("amount", tx.amount)?;
        let date = required_date("date", &tx.date)?;
        let note = optional_label("note", &tx.note)?;

        let id = RecordId::new();
        self.document_mut().treasury.transactions.push(Transaction {
            id: id.clone(),
            amount,
            date,
            kind: tx.kind,
            category_id: tx.category_id,
            note,
        });

        debug!(id = %id, "Transaction recorded");
        Ok(self.commit(id))
    }

    /// Deletes a transaction.
    pub fn delete_transaction(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let transactions = &mut self.document_mut().treasury.transactions;
        let before = transactions.len();
        transactions.retain(|t| &t.id != id);
        if transactions.len() == before {
            return Err(NotFoundError::transaction(id).into());
        }
        Ok(self.commit(()))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Adds a category.
    ///
    /// An empty icon becomes "📦" and an empty color the neutral default.
    pub fn add_category(
        &mut self,
        name: &str,
        icon: &str,
        color: &str,
    ) -> Result<Commit<RecordId>> {
        let name = required_label("name", name)?;
        let icon = optional_label("icon", icon)?;
        let color = optional_label("color", color)?;

        let id = RecordId::new();
        self.document_mut().treasury.categories.push(Category {
            id: id.clone(),
            name,
            icon: if icon.is_empty() { "📦".to_string() } else { icon },
            color: if color.is_empty() {
                DEFAULT_CATEGORY_COLOR.to_string()
            } else {
                color
            },
        });
        Ok(self.commit(id))
    }

    /// Deletes a category.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InUse`] while any transaction references
    /// the category, and `NotFound` if it does not exist. Budgets for the
    /// category are removed with it.
    pub fn delete_category(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let treasury = &self.document().treasury;
        if !treasury.categories.iter().any(|c| &c.id == id) {
            return Err(NotFoundError::category(id).into());
        }
        let references = treasury
            .transactions
            .iter()
            .filter(|t| &t.category_id == id)
            .count();
        if references > 0 {
            return Err(ValidationError::in_use("Category", id, references).into());
        }

        let treasury = &mut self.document_mut().treasury;
        treasury.categories.retain(|c| &c.id != id);
        treasury.budgets.retain(|b| &b.category_id != id);
        Ok(self.commit(()))
    }

    /// Resolves a category id to its display label ("icon name").
    ///
    /// Unknown ids resolve to "Other"; this never fails.
    pub fn category_label(&self, id: &RecordId) -> String {
        match self.document().treasury.categories.iter().find(|c| &c.id == id) {
            Some(c) if c.icon.is_empty() => c.name.clone(),
            Some(c) => format!("{} {}", c.icon, c.name),
            None => FALLBACK_CATEGORY_LABEL.to_string(),
        }
    }

    // =========================================================================
    // Balances
    // =========================================================================

    /// Sets the reconciled bank and cash balances. `None` clears a balance.
    pub fn set_balances(&mut self, bank: Option<f64>, cash: Option<f64>) -> Result<Commit<()>> {
        let bank = bank.map(|v| finite_amount("bankBalance", v)).transpose()?;
        let cash = cash.map(|v| finite_amount("cashBalance", v)).transpose()?;

        let treasury = &mut self.document_mut().treasury;
        treasury.bank_balance = bank;
        treasury.cash_balance = cash;
        Ok(self.commit(()))
    }

    /// Compares the all-time ledger total with the entered balances.
    pub fn reconcile(&self) -> Reconciliation {
        let treasury = &self.document().treasury;
        let tracked: f64 = treasury
            .transactions
            .iter()
            .map(|t| match t.kind {
                TransactionKind::Income => t.amount,
                TransactionKind::Expense => -t.amount,
            })
            .sum();
        let real = treasury.bank_balance.unwrap_or(0.0) + treasury.cash_balance.unwrap_or(0.0);

        Reconciliation {
            tracked,
            real,
            diff: (real > 0.0).then(|| real - tracked),
        }
    }

    // =========================================================================
    // Gold vault
    // =========================================================================

    /// Adds a gold purchase.
    ///
    /// # Errors
    ///
    /// Grams and price must be positive; the date is required.
    pub fn add_gold_entry(&mut self, entry: NewGoldEntry) -> Result<Commit<RecordId>> {
        let grams = positive_amount("grams", entry.grams)?;
        let price_per_gram = positive_amount("pricePerGram", entry.price_per_gram)?;
        let date = required_date("date", &entry.date)?;
        let note = optional_label("note", &entry.note)?;

        let id = RecordId::new();
        self.document_mut().treasury.gold_entries.push(GoldEntry {
            id: id.clone(),
            grams,
            date,
            price_per_gram,
            note,
        });
        Ok(self.commit(id))
    }

    /// Deletes a gold entry.
    pub fn delete_gold_entry(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let entries = &mut self.document_mut().treasury.gold_entries;
        let before = entries.len();
        entries.retain(|g| &g.id != id);
        if entries.len() == before {
            return Err(NotFoundError::gold_entry(id).into());
        }
        Ok(self.commit(()))
    }

    /// Caches a fetched spot quote (USD per troy ounce and EGP per USD).
    ///
    /// Called by the background price sync as well as by the UI.
    #[instrument(skip(self))]
    pub fn record_gold_quote(&mut self, usd_per_oz: f64, egp_rate: f64) -> Result<Commit<()>> {
        let usd_per_oz = positive_amount("usdPerOz", usd_per_oz)?;
        let egp_rate = positive_amount("egpRate", egp_rate)?;

        self.document_mut().treasury.cached_gold_price = Some(GoldQuote {
            usd_per_oz,
            egp_rate,
            timestamp: Timestamp::now(),
            manual_egp_per_gram: None,
        });
        Ok(self.commit(()))
    }

    /// Caches a hand-entered price per gram.
    pub fn set_manual_gold_price(&mut self, price_per_gram: f64) -> Result<Commit<()>> {
        let price = positive_amount("price", price_per_gram)?;

        self.document_mut().treasury.cached_gold_price = Some(GoldQuote {
            usd_per_oz: price * GRAMS_PER_TROY_OUNCE,
            egp_rate: 1.0,
            timestamp: Timestamp::now(),
            manual_egp_per_gram: Some(price),
        });
        Ok(self.commit(()))
    }

    /// Totals of the gold vault, valued at the cached quote if there is one.
    pub fn gold_holdings(&self) -> GoldHoldings {
        let treasury = &self.document().treasury;
        let total_grams: f64 = treasury.gold_entries.iter().map(|g| g.grams).sum();
        let cost_basis: f64 = treasury
            .gold_entries
            .iter()
            .map(|g| g.grams * g.price_per_gram)
            .sum();
        let gram_price = treasury
            .cached_gold_price
            .as_ref()
            .map(GoldQuote::gram_price)
            .filter(|p| p.is_finite() && *p > 0.0);

        GoldHoldings {
            total_grams,
            cost_basis,
            gram_price,
            current_value: gram_price.map(|p| p * total_grams),
        }
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Income and expense totals for a month (`YYYY-MM`).
    pub fn month_summary(&self, month: &str) -> MonthSummary {
        let mut summary = MonthSummary {
            month: month.to_string(),
            ..Default::default()
        };
        for tx in self
            .document()
            .treasury
            .transactions
            .iter()
            .filter(|t| month_key(&t.date) == Some(month))
        {
            match tx.kind {
                TransactionKind::Income => summary.income += tx.amount,
                TransactionKind::Expense => summary.expense += tx.amount,
            }
            summary.count += 1;
        }
        summary
    }

    /// Expenses of a month (`YYYY-MM`) grouped by category, largest first.
    ///
    /// Transactions are grouped by their stored category id, so each
    /// dangling id gets its own "Other" slice.
    pub fn expense_breakdown(&self, month: &str) -> Vec<CategorySpend> {
        let treasury = &self.document().treasury;
        let mut totals: Vec<(&RecordId, f64)> = Vec::new();
        for tx in treasury.transactions.iter().filter(|t| {
            t.kind == TransactionKind::Expense && month_key(&t.date) == Some(month)
        }) {
            match totals.iter_mut().find(|(id, _)| *id == &tx.category_id) {
                Some((_, amount)) => *amount += tx.amount,
                None => totals.push((&tx.category_id, tx.amount)),
            }
        }

        let total: f64 = totals.iter().map(|(_, amount)| amount).sum();
        let mut slices: Vec<CategorySpend> = totals
            .into_iter()
            .map(|(id, amount)| CategorySpend {
                category_id: id.clone(),
                label: self.category_label(id),
                color: treasury
                    .categories
                    .iter()
                    .find(|c| &c.id == id)
                    .map_or_else(|| DEFAULT_CATEGORY_COLOR.to_string(), |c| c.color.clone()),
                amount,
                pct: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
            })
            .collect();
        slices.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        slices
    }

    // =========================================================================
    // Budgets
    // =========================================================================

    /// Sets the monthly limit for a category, replacing any existing budget
    /// for it. Returns the budget id.
    pub fn set_budget(
        &mut self,
        category_id: &RecordId,
        monthly_limit: f64,
    ) -> Result<Commit<RecordId>> {
        let monthly_limit = positive_amount("monthlyLimit", monthly_limit)?;
        if !self
            .document()
            .treasury
            .categories
            .iter()
            .any(|c| &c.id == category_id)
        {
            return Err(NotFoundError::category(category_id).into());
        }

        let budgets = &mut self.document_mut().treasury.budgets;
        let id = match budgets.iter_mut().find(|b| &b.category_id == category_id) {
            Some(existing) => {
                existing.monthly_limit = monthly_limit;
                existing.id.clone()
            }
            None => {
                let id = RecordId::new();
                budgets.push(Budget {
                    id: id.clone(),
                    category_id: category_id.clone(),
                    monthly_limit,
                });
                id
            }
        };
        Ok(self.commit(id))
    }

    /// Deletes a budget.
    pub fn delete_budget(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let budgets = &mut self.document_mut().treasury.budgets;
        let before = budgets.len();
        budgets.retain(|b| &b.id != id);
        if budgets.len() == before {
            return Err(NotFoundError::budget(id).into());
        }
        Ok(self.commit(()))
    }

    /// Spending against every budget in a month (`YYYY-MM`).
    pub fn budget_status(&self, month: &str) -> Vec<BudgetStatus> {
        let treasury = &self.document().treasury;
        treasury
            .budgets
            .iter()
            .map(|budget| {
                let spent = treasury
                    .transactions
                    .iter()
                    .filter(|t| {
                        t.kind == TransactionKind::Expense
                            && t.category_id == budget.category_id
                            && month_key(&t.date) == Some(month)
                    })
                    .map(|t| t.amount)
                    .sum();
                BudgetStatus {
                    budget_id: budget.id.clone(),
                    category: self.category_label(&budget.category_id),
                    limit: budget.monthly_limit,
                    spent,
                }
            })
            .collect()
    }

    // =========================================================================
    // Savings goals
    // =========================================================================

    /// Adds a savings goal.
    pub fn add_goal(
        &mut self,
        name: &str,
        target: f64,
        deadline: Option<&str>,
    ) -> Result<Commit<RecordId>> {
        let name = required_label("name", name)?;
        let target = positive_amount("target", target)?;
        let deadline = optional_date("deadline", deadline)?;

        let id = RecordId::new();
        self.document_mut().treasury.goals.push(SavingsGoal {
            id: id.clone(),
            name,
            target,
            saved: 0.0,
            deadline,
        });
        Ok(self.commit(id))
    }

    /// Adds (or, with a negative amount, withdraws) money from a goal.
    ///
    /// Returns the new saved amount. Savings never drop below zero.
    pub fn contribute_to_goal(&mut self, id: &RecordId, amount: f64) -> Result<Commit<f64>> {
        let amount = finite_amount("amount", amount)?;
        if amount == 0.0 {
            return Err(ValidationError::invalid_field("amount", "must not be zero").into());
        }

        let goal = self
            .document_mut()
            .treasury
            .goals
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| NotFoundError::goal(id))?;
        let saved = non_negative_amount("saved", goal.saved + amount)?;
        goal.saved = saved;
        Ok(self.commit(saved))
    }

    /// Deletes a savings goal.
    pub fn delete_goal(&mut self, id: &RecordId) -> Result<Commit<()>> {
        let goals = &mut self.document_mut().treasury.goals;
        let before = goals.len();
        goals.retain(|g| &g.id != id);
        if goals.len() == before {
            return Err(NotFoundError::goal(id).into());
        }
        Ok(self.commit(()))
    }
}
