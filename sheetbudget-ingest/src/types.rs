use serde::{Deserialize, Serialize};

/// One spreadsheet row as returned by the values API: a list of cell strings.
pub type SheetRow = Vec<String>;

/// Row 1 holds the column headers; data starts on row 2.
pub const FIRST_DATA_ROW: u32 = 2;

pub const TRANSACTION_HEADERS: [&str; 4] = ["Amount", "Merchant", "DateTime", "Category"];
pub const BUDGET_HEADERS: [&str; 6] = ["ID", "Name", "TimeWindow", "StartsOn", "Limit", "Category"];

/// The two sheets the tracker reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SheetKind {
    Transactions,
    Budgets,
}

impl SheetKind {
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            SheetKind::Transactions => &TRANSACTION_HEADERS,
            SheetKind::Budgets => &BUDGET_HEADERS,
        }
    }

    pub fn header_row(&self) -> SheetRow {
        self.headers().iter().map(|h| h.to_string()).collect()
    }
}

/// Column letters used for single-cell writes.
pub mod columns {
    pub const TRANSACTION_CATEGORY: char = 'D';
    pub const BUDGET_NAME: char = 'B';
    pub const BUDGET_LIMIT: char = 'E';
}

/// A1 reference for a single cell, e.g. `Sheet1!D7`.
pub fn cell_ref(sheet: &str, column: char, row_index: u32) -> String {
    format!("{sheet}!{column}{row_index}")
}

/// Zero-based position of a column letter (`'A'` is 0).
pub fn column_index(column: char) -> usize {
    (column.to_ascii_uppercase() as u8).saturating_sub(b'A') as usize
}

/// Cell holding the category of the transaction stored at `row_index`.
pub fn category_cell(sheet: &str, row_index: u32) -> String {
    cell_ref(sheet, columns::TRANSACTION_CATEGORY, row_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_refs() {
        assert_eq!(category_cell("Sheet1", 7), "Sheet1!D7");
        assert_eq!(cell_ref("Budgets", columns::BUDGET_LIMIT, 3), "Budgets!E3");
        assert_eq!(column_index('A'), 0);
        assert_eq!(column_index('d'), 3);
    }

    #[test]
    fn test_header_rows() {
        assert_eq!(SheetKind::Budgets.header_row()[0], "ID");
        assert_eq!(SheetKind::Transactions.headers().len(), 4);
    }
}
