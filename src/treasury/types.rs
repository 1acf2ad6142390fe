//! Type definitions for the treasury (finance ledger).
//!
//! Field names follow the persisted camelCase layout so documents written by
//! earlier app generations decode unchanged.

use serde::{Deserialize, Serialize};

use crate::document::lenient;
use crate::types::{RecordId, Timestamp};

/// Grams in one troy ounce.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

// ============================================================================
// Treasury sub-tree
// ============================================================================

/// The `treasury` sub-tree of the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Treasury {
    /// Income and expense records.
    #[serde(deserialize_with = "lenient::records")]
    pub transactions: Vec<Transaction>,
    /// Spending/income categories. Seeded with nine defaults.
    #[serde(deserialize_with = "lenient::records")]
    pub categories: Vec<Category>,
    /// Last reconciled bank balance, if the user entered one.
    #[serde(deserialize_with = "lenient::optional_amount")]
    pub bank_balance: Option<f64>,
    /// Last reconciled cash-on-hand balance.
    #[serde(deserialize_with = "lenient::optional_amount")]
    pub cash_balance: Option<f64>,
    /// Gold purchases.
    #[serde(deserialize_with = "lenient::records")]
    pub gold_entries: Vec<GoldEntry>,
    /// Most recent gold quote (fetched or entered manually).
    #[serde(deserialize_with = "lenient::optional")]
    pub cached_gold_price: Option<GoldQuote>,
    /// Monthly spending envelopes per category.
    #[serde(deserialize_with = "lenient::records")]
    pub budgets: Vec<Budget>,
    /// Savings goals.
    #[serde(deserialize_with = "lenient::records")]
    pub goals: Vec<SavingsGoal>,
}

impl Default for Treasury {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            categories: default_categories(),
            bank_balance: None,
            cash_balance: None,
            gold_entries: Vec::new(),
            cached_gold_price: None,
            budgets: Vec::new(),
            goals: Vec::new(),
        }
    }
}

/// The nine seeded categories, in display order.
pub fn default_categories() -> Vec<Category> {
    [
        ("cat1", "Food & Feasts", "🍖", "#c0392b"),
        ("cat2", "Shelter", "🏰", "#8e44ad"),
        ("cat3", "Transport", "🐴", "#2980b9"),
        ("cat4", "Entertainment", "🎭", "#f39c12"),
        ("cat5", "Supplies", "⚗️", "#27ae60"),
        ("cat6", "Health", "🧪", "#e74c3c"),
        ("cat7", "Salary", "💼", "#f1c40f"),
        ("cat8", "Freelance", "🗡️", "#1abc9c"),
        ("cat9", "Other", "📦", "#7f8c8d"),
    ]
    .into_iter()
    .map(|(id, name, icon, color)| Category {
        id: RecordId::from(id),
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    })
    .collect()
}

// ============================================================================
// Records
// ============================================================================

/// Direction of money flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received.
    Income,
    /// Money spent.
    #[default]
    Expense,
}

/// A ledger record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// Record id.
    pub id: RecordId,
    /// Positive amount in the display currency.
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: f64,
    /// Booking date (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Category reference. May dangle.
    pub category_id: RecordId,
    /// Free-text note.
    #[serde(deserialize_with = "lenient::text")]
    pub note: String,
}

/// A transaction category.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    /// Record id (`cat1`..`cat9` for the seeded ones).
    pub id: RecordId,
    /// Display name.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// Emoji icon.
    #[serde(deserialize_with = "lenient::text")]
    pub icon: String,
    /// CSS color.
    #[serde(deserialize_with = "lenient::text")]
    pub color: String,
}

/// A gold purchase held in the vault.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldEntry {
    /// Record id.
    pub id: RecordId,
    /// Weight in grams.
    #[serde(deserialize_with = "lenient::amount")]
    pub grams: f64,
    /// Purchase date (`YYYY-MM-DD`).
    #[serde(deserialize_with = "lenient::text")]
    pub date: String,
    /// Price paid per gram.
    #[serde(deserialize_with = "lenient::amount")]
    pub price_per_gram: f64,
    /// Free-text note (karat, form).
    #[serde(deserialize_with = "lenient::text")]
    pub note: String,
}

/// A gold price quote.
///
/// A manual quote also fills `usd_per_oz`/`egp_rate` with synthetic values
/// (`price * 31.1035` and `1.0`) so readers that only know the fetched form
/// compute the same gram price.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoldQuote {
    /// Spot price in USD per troy ounce.
    #[serde(deserialize_with = "lenient::amount")]
    pub usd_per_oz: f64,
    /// EGP per USD.
    #[serde(deserialize_with = "lenient::amount")]
    pub egp_rate: f64,
    /// When the quote was taken.
    pub timestamp: Timestamp,
    /// Price per gram entered by hand, overriding the computed one.
    #[serde(
        rename = "manualEGPperGram",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_amount"
    )]
    pub manual_egp_per_gram: Option<f64>,
}

impl GoldQuote {
    /// Price per gram in the local currency.
    pub fn gram_price(&self) -> f64 {
        match self.manual_egp_per_gram {
            Some(price) => price,
            None => self.usd_per_oz / GRAMS_PER_TROY_OUNCE * self.egp_rate,
        }
    }
}

/// A monthly spending envelope for one category.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Budget {
    /// Record id.
    pub id: RecordId,
    /// Category the limit applies to.
    pub category_id: RecordId,
    /// Maximum monthly spending.
    #[serde(deserialize_with = "lenient::amount")]
    pub monthly_limit: f64,
}

/// A savings goal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavingsGoal {
    /// Record id.
    pub id: RecordId,
    /// Display name.
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    /// Amount to reach.
    #[serde(deserialize_with = "lenient::amount")]
    pub target: f64,
    /// Amount set aside so far.
    #[serde(deserialize_with = "lenient::amount")]
    pub saved: f64,
    /// Optional target date (`YYYY-MM-DD`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl SavingsGoal {
    /// Fraction of the target reached, capped at 1.0.
    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        (self.saved / self.target).clamp(0.0, 1.0)
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for [`CodexDB::add_transaction`](crate::CodexDB::add_transaction).
#[derive(Clone, Debug, Default)]
pub struct NewTransaction {
    /// Positive, finite amount.
    pub amount: f64,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Category reference (not required to exist).
    pub category_id: RecordId,
    /// Free-text note.
    pub note: String,
}

/// Input for [`CodexDB::add_gold_entry`](crate::CodexDB::add_gold_entry).
#[derive(Clone, Debug, Default)]
pub struct NewGoldEntry {
    /// Grams, > 0.
    pub grams: f64,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Price per gram paid, > 0.
    pub price_per_gram: f64,
    /// Free-text note.
    pub note: String,
}

// ============================================================================
// Read models
// ============================================================================

/// Totals for one calendar month.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthSummary {
    /// Month key (`YYYY-MM`).
    pub month: String,
    /// Sum of income.
    pub income: f64,
    /// Sum of expenses.
    pub expense: f64,
    /// Number of transactions in the month.
    pub count: usize,
}

impl MonthSummary {
    /// Income minus expenses.
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// One slice of a month's spending.
#[derive(Clone, Debug, PartialEq)]
pub struct CategorySpend {
    /// Category reference as stored on the transactions.
    pub category_id: RecordId,
    /// Resolved label ("Other" if dangling).
    pub label: String,
    /// Category color, or the fallback color if dangling.
    pub color: String,
    /// Expenses booked to the category.
    pub amount: f64,
    /// Share of the month's expenses, 0..=100.
    pub pct: f64,
}

/// The ledger compared with the balances the user entered.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Reconciliation {
    /// All-time income minus expenses.
    pub tracked: f64,
    /// Bank plus cash balance (missing balances count as 0).
    pub real: f64,
    /// `real - tracked`, once a positive real total has been entered.
    pub diff: Option<f64>,
}

impl Reconciliation {
    /// True when the entered balances match the ledger to the cent.
    pub fn is_balanced(&self) -> bool {
        self.diff.is_some_and(|d| d.abs() < 0.005)
    }
}

/// Aggregate view of the gold vault.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GoldHoldings {
    /// Total grams held.
    pub total_grams: f64,
    /// Total paid for all entries.
    pub cost_basis: f64,
    /// Current price per gram, if a quote is cached.
    pub gram_price: Option<f64>,
    /// Current value, if a quote is cached.
    pub current_value: Option<f64>,
}

impl GoldHoldings {
    /// Unrealized gain against the cost basis, if a quote is cached.
    pub fn gain(&self) -> Option<f64> {
        self.current_value.map(|value| value - self.cost_basis)
    }
}

/// Spending against one budget envelope in a month.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetStatus {
    /// The budget.
    pub budget_id: RecordId,
    /// Category label (resolved, "Other" if dangling).
    pub category: String,
    /// Monthly limit.
    pub limit: f64,
    /// Expenses booked to the category in the month.
    pub spent: f64,
}

impl BudgetStatus {
    /// Remaining allowance (negative when over budget).
    pub fn remaining(&self) -> f64 {
        self.limit - self.spent
    }

    /// True when spending exceeds the limit.
    pub fn is_over(&self) -> bool {
        self.spent > self.limit
    }
}
