//! Joining budgets to the transactions of their current period.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::budget::{Budget, FilledBudget};
use crate::period::current_period;
use crate::transaction::{categories_match, category_key, Transaction};

/// Catch-all choice offered after the budget categories.
pub const OTHER_CATEGORY: &str = "Other";

/// Round a currency amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Build the current-period view of every budget.
///
/// Output order follows `budgets`; each budget's transactions keep the order
/// of `transactions`. Rows whose timestamp cannot be parsed are skipped.
pub fn fill_budgets(
    budgets: &[Budget],
    transactions: &[Transaction],
    now: NaiveDateTime,
) -> Vec<FilledBudget> {
    budgets
        .iter()
        .map(|budget| {
            let period = current_period(now, budget.window);
            let matching: Vec<Transaction> = transactions
                .iter()
                .filter(|t| categories_match(&t.category, &budget.category))
                .filter(|t| match t.occurred() {
                    Some(at) => period.contains(at),
                    None => {
                        tracing::trace!(row = t.row_index, raw = %t.occurred_at, "skipping undated transaction");
                        false
                    }
                })
                .cloned()
                .collect();

            let current_value = matching.iter().map(|t| t.amount).sum();
            FilledBudget {
                budget: budget.clone(),
                transactions: matching,
                current_value,
            }
        })
        .collect()
}

/// Transactions whose category is empty or whitespace.
pub fn uncategorized(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| t.is_uncategorized())
        .cloned()
        .collect()
}

/// Categories offered when categorizing a transaction: each distinct budget
/// category (first spelling wins) followed by [`OTHER_CATEGORY`].
pub fn category_choices(budgets: &[Budget]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for b in budgets {
        if let Some(key) = category_key(&b.category) {
            if seen.insert(key) {
                out.push(b.category.trim().to_string());
            }
        }
    }
    if seen.insert(OTHER_CATEGORY.to_lowercase()) {
        out.push(OTHER_CATEGORY.to_string());
    }
    out
}
