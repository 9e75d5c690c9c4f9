//! Transaction rows as read from the transactions sheet.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dates::parse_timestamp;

/// A single spend row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub amount: f64,
    pub merchant: String,
    /// Timestamp exactly as it appears in the sheet
    pub occurred_at: String,
    /// May be empty for rows awaiting categorization
    pub category: String,
    /// 1-based sheet row (row 1 is the header)
    pub row_index: u32,
}

impl Transaction {
    pub fn new(
        amount: f64,
        merchant: impl Into<String>,
        occurred_at: impl Into<String>,
        category: impl Into<String>,
        row_index: u32,
    ) -> Self {
        Self {
            amount,
            merchant: merchant.into(),
            occurred_at: occurred_at.into(),
            category: category.into(),
            row_index,
        }
    }

    /// Parsed timestamp, or `None` when the sheet value is unreadable.
    pub fn occurred(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.occurred_at)
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category.trim().is_empty()
    }
}

/// Normalized key used to match a transaction category against a budget category.
///
/// Empty (after trimming) categories have no key and never match.
pub fn category_key(category: &str) -> Option<String> {
    let k = category.trim().to_lowercase();
    if k.is_empty() { None } else { Some(k) }
}

/// True when both categories are non-empty and equal after trim + case folding.
pub fn categories_match(a: &str, b: &str) -> bool {
    match (category_key(a), category_key(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
