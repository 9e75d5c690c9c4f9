//! sheetbudget-ingest: conversion between spreadsheet rows and budget/transaction types,
//! plus a local CSV mirror of the two sheets.

pub mod csv_store;
pub mod parsers;
pub mod types;

pub use parsers::{budget_to_row, find_budget_row, new_budget_id, parse_budget_rows, parse_transaction_rows};
pub use types::{category_cell, cell_ref, columns, SheetKind, SheetRow, FIRST_DATA_ROW};
