//! Budgets sheet parser and row writer
//!
//! Layout (header on row 1):
//!   ID                          Name       TimeWindow  StartsOn  Limit  Category
//!   budget_1704067200000_k3j9   Groceries  monthly                400    groceries
//!   budget_1704067200001_p2m1   Coffee     weekly      monday    25     coffee

use chrono::NaiveDateTime;
use sheetbudget_core::{Budget, TimeWindow, WeekStart};
use uuid::Uuid;

use crate::types::{SheetRow, FIRST_DATA_ROW};

fn cell(row: &SheetRow, i: usize) -> &str {
    row.get(i).map(|s| s.trim()).unwrap_or("")
}

/// Interpret the TimeWindow/StartsOn cells. Unknown windows fall back to
/// monthly; a weekly budget with no start day starts on Sunday.
pub fn parse_window(window: &str, starts_on: &str) -> TimeWindow {
    match window.trim().to_lowercase().as_str() {
        "weekly" => TimeWindow::weekly(WeekStart::parse(starts_on).unwrap_or_default()),
        _ => TimeWindow::Monthly,
    }
}

/// Parse the raw values of the budgets sheet, header row included.
///
/// Rows with an empty ID cell (trailing blanks the API sometimes returns) are skipped.
pub fn parse_budget_rows(rows: &[SheetRow]) -> Vec<Budget> {
    rows.iter()
        .skip(1)
        .filter(|row| !cell(row, 0).is_empty())
        .map(|row| {
            let limit = cell(row, 4).parse().unwrap_or_else(|_| {
                tracing::warn!(budget = cell(row, 0), raw = cell(row, 4), "unreadable budget limit; using 0");
                0.0
            });
            Budget::new(
                cell(row, 0),
                cell(row, 1),
                cell(row, 5),
                limit,
                parse_window(cell(row, 2), cell(row, 3)),
            )
        })
        .collect()
}

/// Cells for appending `budget` to the budgets sheet.
pub fn budget_to_row(budget: &Budget) -> SheetRow {
    vec![
        budget.id.clone(),
        budget.name.clone(),
        budget.window.as_str().to_string(),
        budget
            .window
            .week_start()
            .map(|w| w.as_str().to_string())
            .unwrap_or_default(),
        budget.limit.to_string(),
        budget.category.clone(),
    ]
}

/// Sheet row number of the budget with `id`, if present.
pub fn find_budget_row(rows: &[SheetRow], id: &str) -> Option<u32> {
    rows.iter()
        .skip(1)
        .position(|row| cell(row, 0) == id)
        .map(|i| i as u32 + FIRST_DATA_ROW)
}

/// Fresh budget id: `budget_<unix millis>_<9 random alphanumerics>`.
pub fn new_budget_id(now: NaiveDateTime) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("budget_{}_{}", now.and_utc().timestamp_millis(), &suffix[..9])
}
