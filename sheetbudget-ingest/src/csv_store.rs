//! Local CSV copies of the sheets.
//!
//! Each file holds exactly what the spreadsheet would: a header row followed
//! by data rows, so the same row parsers and row numbers apply.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::types::{column_index, SheetKind, SheetRow, FIRST_DATA_ROW};

/// Read every row of `path`, header included.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<SheetRow>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(rows)
}

/// Replace the contents of `path` with `rows`.
pub fn write_rows(path: impl AsRef<Path>, rows: &[SheetRow]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {} for write", path.display()))?;
    for row in rows {
        wtr.write_record(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    wtr.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Create `path` with the header row of `kind` if it does not exist yet.
pub fn ensure_sheet(path: impl AsRef<Path>, kind: SheetKind) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    tracing::info!(path = %path.display(), ?kind, "creating local sheet");
    write_rows(path, &[kind.header_row()])
}

/// Append one data row, creating the file (with headers) when missing.
pub fn append_row(path: impl AsRef<Path>, kind: SheetKind, row: SheetRow) -> Result<()> {
    let path = path.as_ref();
    ensure_sheet(path, kind)?;
    let mut rows = read_rows(path)?;
    rows.push(row);
    write_rows(path, &rows)
}

/// Overwrite a single cell addressed by sheet row number and column letter.
pub fn update_cell(path: impl AsRef<Path>, row_index: u32, column: char, value: &str) -> Result<()> {
    let path = path.as_ref();
    let mut rows = read_rows(path)?;

    if row_index < FIRST_DATA_ROW || row_index as usize > rows.len() {
        bail!("row {} is outside {} ({} rows)", row_index, path.display(), rows.len());
    }
    let row = &mut rows[row_index as usize - 1];
    let col = column_index(column);
    if row.len() <= col {
        row.resize(col + 1, String::new());
    }
    row[col] = value.to_string();

    write_rows(path, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{parse_budget_rows, parse_transaction_rows};

    #[test]
    fn test_update_category_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(
            &path,
            "Amount,Merchant,DateTime,Category\n\
             $12.00,CAFE,01/02/2024 08:00 AM EST,\n\
             40,MARKET,01/03/2024 05:00 PM EST,Groceries\n",
        )
        .unwrap();

        update_cell(&path, 2, 'D', "Coffee").unwrap();

        let txns = parse_transaction_rows(&read_rows(&path).unwrap());
        assert_eq!(txns[0].category, "Coffee");
        assert_eq!(txns[0].amount, 12.0);
        assert_eq!(txns[1].category, "Groceries");
    }

    #[test]
    fn test_update_pads_short_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(&path, "Amount,Merchant,DateTime,Category\n5,SHOP\n").unwrap();

        update_cell(&path, 2, 'D', "Misc").unwrap();
        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[1], vec!["5", "SHOP", "", "Misc"]);
    }

    #[test]
    fn test_update_rejects_header_and_missing_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.csv");
        fs::write(&path, "Amount,Merchant,DateTime,Category\n5,SHOP,,\n").unwrap();

        assert!(update_cell(&path, 1, 'D', "x").is_err());
        assert!(update_cell(&path, 3, 'D', "x").is_err());
    }

    #[test]
    fn test_append_creates_budget_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("budgets.csv");

        let row: SheetRow = ["b-1", "Coffee", "weekly", "monday", "25", "coffee"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        append_row(&path, SheetKind::Budgets, row).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows[0], SheetKind::Budgets.header_row());
        let budgets = parse_budget_rows(&rows);
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Coffee");
    }
}
