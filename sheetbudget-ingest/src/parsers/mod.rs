pub mod budgets;
pub mod transactions;

pub use budgets::{budget_to_row, find_budget_row, new_budget_id, parse_budget_rows, parse_window};
pub use transactions::{parse_amount, parse_transaction_rows};
