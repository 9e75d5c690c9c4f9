//! Transactions sheet parser
//!
//! Layout (header on row 1):
//!   Amount     Merchant          DateTime                  Category
//!   $1,204.50  LANDLORD LLC      01/01/2024 09:00 AM EST   Rent
//!   4.75       BLUE BOTTLE       01/02/2024 07:41 AM EST

use std::sync::LazyLock;

use regex::Regex;
use sheetbudget_core::Transaction;

use crate::types::{SheetRow, FIRST_DATA_ROW};

static AMOUNT_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$,\s]").expect("amount regex is valid"));

/// Parse a currency cell such as `$1,204.50`. Unreadable cells count as 0.
pub fn parse_amount(cell: &str) -> f64 {
    let cleaned = AMOUNT_NOISE.replace_all(cell, "");
    cleaned.parse().unwrap_or(0.0)
}

fn cell(row: &SheetRow, i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

/// Parse the raw values of the transactions sheet, header row included.
///
/// Every data row becomes a transaction tagged with its sheet row number so a
/// later category write can address it.
pub fn parse_transaction_rows(rows: &[SheetRow]) -> Vec<Transaction> {
    rows.iter()
        .skip(1)
        .enumerate()
        .map(|(i, row)| {
            Transaction::new(
                parse_amount(cell(row, 0)),
                cell(row, 1),
                cell(row, 2),
                cell(row, 3),
                i as u32 + FIRST_DATA_ROW,
            )
        })
        .collect()
}
