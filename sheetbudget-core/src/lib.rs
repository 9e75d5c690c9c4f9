//! sheetbudget-core: budget periods and spend aggregation
//!
//! Everything here is a pure function of its arguments. The caller supplies
//! the transactions, the budget definitions and the current local time.

pub mod aggregate;
pub mod budget;
pub mod dates;
pub mod history;
pub mod period;
pub mod transaction;

pub use aggregate::{category_choices, fill_budgets, round_cents, uncategorized, OTHER_CATEGORY};
pub use budget::{Budget, FilledBudget};
pub use dates::{parse_horizon, parse_timestamp};
pub use history::{historical_series, BudgetHistory, HistoricalPoint, HistorySummary};
pub use period::{
    current_period, in_period, progress_fraction, step_backward, step_forward, Period, TimeWindow,
    WeekStart,
};
pub use transaction::{categories_match, category_key, Transaction};
