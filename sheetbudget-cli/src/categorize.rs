//! Assigning categories to uncategorized transactions.

use anyhow::{bail, Context, Result};
use sheetbudget_core::{category_choices, uncategorized, Budget, Transaction};
use std::io::{self, Write};

use crate::ledger::Ledger;

/// Set the category of the transaction at `row_index`.
///
/// The in-memory snapshot is updated first; if the sheet write fails the
/// previous category is put back and the error is returned.
pub(crate) async fn apply_category_edit<L: Ledger>(
    ledger: &L,
    transactions: &mut [Transaction],
    row_index: u32,
    category: &str,
) -> Result<()> {
    let category = category.trim();
    if category.is_empty() {
        bail!("category must not be empty");
    }
    let Some(txn) = transactions.iter_mut().find(|t| t.row_index == row_index) else {
        bail!("no transaction at row {row_index}");
    };

    let prior = std::mem::replace(&mut txn.category, category.to_string());
    if let Err(e) = ledger.set_transaction_category(row_index, category).await {
        tracing::warn!(row = row_index, error = %e, "category write failed; restoring previous value");
        if let Some(txn) = transactions.iter_mut().find(|t| t.row_index == row_index) {
            txn.category = prior;
        }
        return Err(e);
    }
    tracing::info!(row = row_index, category, "categorized transaction");
    Ok(())
}

/// Resolve a picker answer: a 1-based index into `choices`, or free text.
pub(crate) fn resolve_choice(answer: &str, choices: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=choices.len()).contains(&n) => Some(choices[n - 1].clone()),
        Ok(_) => None,
        Err(_) => Some(answer.to_string()),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Walk every uncategorized transaction and ask for a category.
///
/// Blank answers skip a row; `q` stops.
pub(crate) async fn run_interactive<L: Ledger>(
    ledger: &L,
    budgets: &[Budget],
    transactions: &mut [Transaction],
) -> Result<()> {
    let pending = uncategorized(transactions);
    if pending.is_empty() {
        println!("Nothing to categorize. All caught up!");
        return Ok(());
    }

    let choices = category_choices(budgets);
    println!("{} uncategorized transactions\n", pending.len());
    for (i, c) in choices.iter().enumerate() {
        println!("  {}) {}", i + 1, c);
    }
    println!();

    let mut done = 0;
    for t in &pending {
        println!("row {} | {} | ${:.2} | {}", t.row_index, t.merchant, t.amount, t.occurred_at);
        let answer = prompt("Category # or name (blank = skip, q = quit)")?;
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        let Some(category) = resolve_choice(&answer, &choices) else {
            continue;
        };
        match apply_category_edit(ledger, transactions, t.row_index, &category).await {
            Ok(()) => done += 1,
            Err(e) => {
                // Session problems won't fix themselves on the next row.
                if e.downcast_ref::<crate::sheets::SheetsError>().is_some() {
                    return Err(e).context("stopping categorization");
                }
                println!("  failed to update row {}: {e:#}", t.row_index);
            }
        }
    }

    println!("\nCategorized {done} of {} transactions.", pending.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeLedger {
        fail: bool,
        writes: RefCell<Vec<(u32, String)>>,
    }

    impl FakeLedger {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                writes: RefCell::new(Vec::new()),
            }
        }
    }

    impl Ledger for FakeLedger {
        async fn fetch_budget_definitions(&self) -> Result<Vec<Budget>> {
            Ok(vec![])
        }

        async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
            Ok(vec![])
        }

        async fn set_transaction_category(&self, row_index: u32, category: &str) -> Result<()> {
            if self.fail {
                bail!("network down");
            }
            self.writes.borrow_mut().push((row_index, category.to_string()));
            Ok(())
        }

        async fn create_budget(&self, _budget: &Budget) -> Result<()> {
            Ok(())
        }

        async fn update_budget(&self, _id: &str, _name: &str, _limit: f64) -> Result<()> {
            Ok(())
        }
    }

    fn snapshot() -> Vec<Transaction> {
        vec![
            Transaction::new(9.5, "CAFE", "01/02/2024 08:00 AM EST", "", 2),
            Transaction::new(40.0, "MARKET", "01/03/2024 05:00 PM EST", "Groceries", 3),
        ]
    }

    #[tokio::test]
    async fn test_successful_edit_keeps_new_category() {
        let ledger = FakeLedger::new(false);
        let mut txns = snapshot();

        apply_category_edit(&ledger, &mut txns, 2, " Coffee ").await.unwrap();

        assert_eq!(txns[0].category, "Coffee");
        assert_eq!(ledger.writes.borrow().as_slice(), &[(2, "Coffee".to_string())]);
    }

    #[tokio::test]
    async fn test_failed_edit_rolls_back() {
        let ledger = FakeLedger::new(true);
        let mut txns = snapshot();

        let err = apply_category_edit(&ledger, &mut txns, 3, "Dining").await.unwrap_err();

        assert!(err.to_string().contains("network down"));
        assert_eq!(txns[1].category, "Groceries");
        assert_eq!(txns[0].category, "");
    }

    #[tokio::test]
    async fn test_unknown_row_and_empty_category() {
        let ledger = FakeLedger::new(false);
        let mut txns = snapshot();

        assert!(apply_category_edit(&ledger, &mut txns, 99, "Dining").await.is_err());
        assert!(apply_category_edit(&ledger, &mut txns, 2, "   ").await.is_err());
        assert!(ledger.writes.borrow().is_empty());
    }

    #[test]
    fn test_resolve_choice() {
        let choices = vec!["Groceries".to_string(), "Other".to_string()];
        assert_eq!(resolve_choice("1", &choices), Some("Groceries".to_string()));
        assert_eq!(resolve_choice("2", &choices), Some("Other".to_string()));
        assert_eq!(resolve_choice("3", &choices), None);
        assert_eq!(resolve_choice("", &choices), None);
        assert_eq!(resolve_choice("Travel", &choices), Some("Travel".to_string()));
    }
}
