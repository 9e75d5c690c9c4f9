//! Budget definitions and their current-period view.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::period::TimeWindow;
use crate::transaction::Transaction;

/// A recurring spending limit for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub category: String,
    pub limit: f64,
    pub window: TimeWindow,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        limit: f64,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            limit,
            window,
        }
    }

    /// Checks applied before a new budget is written to the sheet.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("budget name must not be empty");
        }
        if self.category.trim().is_empty() {
            bail!("budget category must not be empty");
        }
        if !(self.limit.is_finite() && self.limit > 0.0) {
            bail!("budget limit must be a positive amount (got {})", self.limit);
        }
        Ok(())
    }
}

/// A budget joined with the transactions of its current period.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilledBudget {
    #[serde(flatten)]
    pub budget: Budget,
    pub transactions: Vec<Transaction>,
    pub current_value: f64,
}

impl FilledBudget {
    pub fn is_over_budget(&self) -> bool {
        self.current_value > self.budget.limit
    }

    /// Spend relative to the limit (unclamped; 0 when the limit is not positive).
    pub fn spend_fraction(&self) -> f64 {
        if self.budget.limit > 0.0 {
            self.current_value / self.budget.limit
        } else {
            0.0
        }
    }

    pub fn remaining(&self) -> f64 {
        self.budget.limit - self.current_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::WeekStart;

    #[test]
    fn test_validate() {
        let ok = Budget::new("b1", "Food", "Groceries", 250.0, TimeWindow::Monthly);
        assert!(ok.validate().is_ok());

        let mut bad = ok.clone();
        bad.limit = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = ok.clone();
        bad.category = "  ".into();
        assert!(bad.validate().is_err());

        let mut bad = ok;
        bad.limit = f64::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_filled_budget_serializes_flat() {
        let filled = FilledBudget {
            budget: Budget::new(
                "b1",
                "Coffee",
                "coffee",
                20.0,
                TimeWindow::weekly(WeekStart::Monday),
            ),
            transactions: vec![],
            current_value: 0.0,
        };
        let v = serde_json::to_value(&filled).unwrap();
        assert_eq!(v["name"], "Coffee");
        assert_eq!(v["window"]["kind"], "weekly");
        assert_eq!(v["window"]["starts_on"], "monday");
        assert_eq!(v["current_value"], 0.0);
        assert_eq!(filled.spend_fraction(), 0.0);
        assert!(!filled.is_over_budget());
    }
}
