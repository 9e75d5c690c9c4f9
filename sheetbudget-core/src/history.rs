//! Per-period spend history for trend charts.
//!
//! The walk starts at the period containing the anchor instant and steps
//! backward one period at a time until a period would start before the
//! horizon. Each period's spend is rounded to cents before it is added to
//! the running totals, so chart values and the summary agree to the cent.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::aggregate::round_cents;
use crate::budget::Budget;
use crate::period::{current_period, step_backward};
use crate::transaction::{categories_match, Transaction};

/// One past period's total spend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalPoint {
    pub label: String,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    pub spent: f64,
    pub over_limit: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HistorySummary {
    pub total_spent: f64,
    pub average_spent: f64,
    pub period_count: usize,
    pub periods_over_limit: usize,
    /// Share of periods at or under the limit, in `[0, 1]`
    pub fraction_within_limit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetHistory {
    /// Oldest period first
    pub points: Vec<HistoricalPoint>,
    pub summary: HistorySummary,
}

/// Reconstruct every period of `budget` from the most recent one back to `horizon`.
///
/// The anchor is `now`, unless a matching transaction is dated later than
/// `now`, in which case the latest such date is used.
///
/// Only whole periods are reported: a period starting before `horizon` is
/// left out even when `horizon` falls inside it.
pub fn historical_series(
    budget: &Budget,
    transactions: &[Transaction],
    horizon: NaiveDateTime,
    now: NaiveDateTime,
) -> BudgetHistory {
    let dated: Vec<(NaiveDateTime, f64)> = transactions
        .iter()
        .filter(|t| categories_match(&t.category, &budget.category))
        .filter_map(|t| t.occurred().map(|at| (at, t.amount)))
        .collect();

    let anchor = match dated.iter().map(|(at, _)| *at).max() {
        Some(latest) if latest > now => latest,
        _ => now,
    };

    let mut points = Vec::new();
    let mut total_spent = 0.0;
    let mut periods_over_limit = 0;

    let mut period = current_period(anchor, budget.window);
    while period.start >= horizon {
        let spent = round_cents(
            dated
                .iter()
                .filter(|(at, _)| period.contains(*at))
                .map(|(_, amount)| amount)
                .sum(),
        );
        let over_limit = spent > budget.limit;
        if over_limit {
            periods_over_limit += 1;
        }
        total_spent = round_cents(total_spent + spent);

        points.push(HistoricalPoint {
            label: period.label(budget.window),
            period_start: period.start,
            period_end: period.end,
            spent,
            over_limit,
        });
        period = step_backward(period, budget.window);
    }
    points.reverse();

    let period_count = points.len();
    let (average_spent, fraction_within_limit) = if period_count == 0 {
        (0.0, 0.0)
    } else {
        let n = period_count as f64;
        (
            total_spent / n,
            (period_count - periods_over_limit) as f64 / n,
        )
    };

    tracing::debug!(
        budget = %budget.id,
        periods = period_count,
        total = total_spent,
        "reconstructed budget history"
    );

    BudgetHistory {
        points,
        summary: HistorySummary {
            total_spent,
            average_spent,
            period_count,
            periods_over_limit,
            fraction_within_limit,
        },
    }
}
